// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! One line per commit:
//!
//! ```text
//! {"seq":7,"checksum":2851637153,"ops":[{"TaskUpsert":{...}},{"RollupApply":{...}}]}
//! ```
//!
//! The checksum is a CRC32 of the exact `ops` bytes. Reading stops at the
//! first line that is unterminated, fails to parse, fails its checksum or
//! breaks the sequence; everything from there on is a torn write and is
//! cut off when the log is opened for writing.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zm_core::Operation;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One committed batch of operations
#[derive(Debug, Clone, PartialEq)]
pub struct WalEntry {
    pub sequence: u64,
    pub ops: Vec<Operation>,
}

#[derive(Serialize, Deserialize)]
struct Line {
    seq: u64,
    checksum: u32,
    ops: Box<RawValue>,
}

/// Result of scanning a log file
struct Scan {
    entries: Vec<WalEntry>,
    /// Byte length of the valid prefix
    valid_len: u64,
    /// Why scanning stopped early, if it did
    torn: Option<String>,
}

/// Write-ahead log for durable operation storage
pub struct Wal {
    path: PathBuf,
    file: File,
    sequence: u64,
    len: u64,
}

impl Wal {
    /// Open or create a WAL, returning it with every valid entry.
    ///
    /// A torn tail is truncated so the next append starts on a clean line.
    pub fn open(path: &Path) -> Result<(Self, Vec<WalEntry>), WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let scan = Self::scan(path)?;
        if let Some(reason) = &scan.torn {
            tracing::warn!(
                path = %path.display(),
                valid_entries = scan.entries.len(),
                valid_len = scan.valid_len,
                reason = %reason,
                "WAL has a torn tail, truncating"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let sequence = scan.entries.last().map_or(0, |e| e.sequence);

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                sequence,
                len: scan.valid_len,
            },
            scan.entries,
        ))
    }

    /// Append a batch as one entry; durable (fsync'd) before returning
    pub fn append(&mut self, ops: &[Operation]) -> Result<u64, WalError> {
        let sequence = self.sequence + 1;
        let ops_json = serde_json::to_string(ops)?;
        let line = Line {
            seq: sequence,
            checksum: crc32fast::hash(ops_json.as_bytes()),
            ops: RawValue::from_string(ops_json)?,
        };
        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');

        if let Err(e) = self.write_durably(&bytes) {
            // Drop whatever part of the line reached the file
            let _ = self.file.set_len(self.len);
            return Err(e.into());
        }

        self.sequence = sequence;
        self.len += bytes.len() as u64;
        Ok(sequence)
    }

    fn write_durably(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.sync_all()
    }

    /// Get the last committed sequence number (0 when empty)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid entry without modifying the file
    pub fn replay(path: &Path) -> Result<Vec<WalEntry>, WalError> {
        Ok(Self::scan(path)?.entries)
    }

    fn scan(path: &Path) -> Result<Scan, WalError> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        let mut offset = 0usize;
        let mut torn = None;

        while offset < bytes.len() {
            let rest = &bytes[offset..];
            let Some(end) = rest.iter().position(|b| *b == b'\n') else {
                torn = Some("unterminated final line".to_string());
                break;
            };
            let raw = &rest[..end];
            let next_offset = offset + end + 1;

            if raw.iter().all(u8::is_ascii_whitespace) {
                offset = next_offset;
                continue;
            }

            let expected = entries.last().map_or(1, |e: &WalEntry| e.sequence + 1);
            match Self::decode(raw, expected) {
                Ok(entry) => {
                    entries.push(entry);
                    offset = next_offset;
                }
                Err(reason) => {
                    torn = Some(format!("entry {}: {}", expected, reason));
                    break;
                }
            }
        }

        Ok(Scan {
            entries,
            valid_len: offset as u64,
            torn,
        })
    }

    fn decode(raw: &[u8], expected: u64) -> Result<WalEntry, String> {
        let line: Line = serde_json::from_slice(raw).map_err(|e| e.to_string())?;
        if crc32fast::hash(line.ops.get().as_bytes()) != line.checksum {
            return Err("checksum mismatch".to_string());
        }
        if line.seq != expected {
            return Err(format!("sequence {} out of order", line.seq));
        }
        let ops: Vec<Operation> =
            serde_json::from_str(line.ops.get()).map_err(|e| e.to_string())?;
        Ok(WalEntry {
            sequence: line.seq,
            ops,
        })
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
