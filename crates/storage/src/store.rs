// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store: WAL plus materialized state

use crate::state::{ApplyError, MaterializedState};
use crate::wal::{Wal, WalError};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use zm_core::Operation;

const WAL_FILE: &str = "wal.jsonl";
const LOCK_FILE: &str = "wal.lock";

/// Pause between attempts while another process holds the store lock
const LOCK_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation {kind} rejected: {source}")]
    Rejected {
        kind: &'static str,
        #[source]
        source: ApplyError,
    },
    #[error("store {} is locked by another process", path.display())]
    Locked { path: PathBuf },
    #[error("WAL entry {sequence} does not replay: {source}")]
    Replay {
        sequence: u64,
        #[source]
        source: ApplyError,
    },
}

impl StorageError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Locked { .. })
    }
}

/// State plus the log it is derived from.
///
/// An on-disk store holds an exclusive lock on its directory for its whole
/// lifetime, so at most one process appends to a WAL.
pub struct Store {
    wal: Option<Wal>,
    state: MaterializedState,
    sequence: u64,
    _lock: Option<File>,
}

impl Store {
    /// Open the store in `dir`, failing at once if another process has it
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        Self::open_with_wait(dir, Duration::ZERO)
    }

    /// Open the store in `dir`, waiting up to `wait` for its lock
    pub fn open_with_wait(dir: &Path, wait: Duration) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        let lock = acquire_lock(&dir.join(LOCK_FILE), wait)?;
        let (wal, entries) = Wal::open(&dir.join(WAL_FILE))?;

        let mut state = MaterializedState::default();
        for entry in &entries {
            for op in &entry.ops {
                state.apply(op).map_err(|source| StorageError::Replay {
                    sequence: entry.sequence,
                    source,
                })?;
            }
        }

        let sequence = wal.sequence();
        tracing::info!(dir = %dir.display(), entries = entries.len(), sequence, "store opened");
        Ok(Self {
            wal: Some(wal),
            state,
            sequence,
            _lock: Some(lock),
        })
    }

    /// A store with no backing file, for tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            wal: None,
            state: MaterializedState::default(),
            sequence: 0,
            _lock: None,
        }
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Sequence of the last commit
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Apply a batch atomically.
    ///
    /// Every operation is applied to a staged copy first; the batch is
    /// written to the WAL only if all of them succeed, and the staged state
    /// replaces the current one only once the write is durable.
    pub fn commit(&mut self, ops: Vec<Operation>) -> Result<u64, StorageError> {
        if ops.is_empty() {
            return Ok(self.sequence);
        }

        let mut staged = self.state.clone();
        for op in &ops {
            staged.apply(op).map_err(|source| StorageError::Rejected {
                kind: op.kind(),
                source,
            })?;
        }

        let sequence = match self.wal.as_mut() {
            Some(wal) => wal.append(&ops)?,
            None => self.sequence + 1,
        };

        self.state = staged;
        self.sequence = sequence;
        tracing::debug!(sequence, ops = ops.len(), "committed");
        Ok(sequence)
    }
}

fn acquire_lock(path: &Path, wait: Duration) -> Result<File, StorageError> {
    let file = File::create(path)?;
    let deadline = Instant::now() + wait;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                if Instant::now() >= deadline {
                    tracing::warn!(path = %path.display(), "store lock is held elsewhere");
                    return Err(StorageError::Locked {
                        path: path.to_path_buf(),
                    });
                }
                std::thread::sleep(LOCK_POLL);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
