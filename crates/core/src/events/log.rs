// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log for audit trail

use super::bus::EventReceiver;
use super::subscription::EventPattern;
use crate::event::Event;
use crate::id::TenantId;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// A logged event with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic sequence number
    pub sequence: u64,
    /// The dotted event name
    pub name: String,
    pub tenant_id: TenantId,
    /// The full event data
    pub event: Event,
}

/// Filter over logged records; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub tenant_id: Option<TenantId>,
    pub pattern: Option<EventPattern>,
    /// Only records with a greater sequence
    pub after: u64,
}

impl EventQuery {
    pub fn tenant(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: EventPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn after(mut self, sequence: u64) -> Self {
        self.after = sequence;
        self
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        record.sequence > self.after
            && self.tenant_id.as_ref().map_or(true, |t| &record.tenant_id == t)
            && self.pattern.as_ref().map_or(true, |p| p.matches(&record.name))
    }
}

/// Append-only JSONL audit trail
pub struct EventLog {
    path: PathBuf,
    sequence: u64,
}

impl EventLog {
    /// Open or create an event log at the given path
    pub fn open(path: PathBuf) -> std::io::Result<Self> {
        // Count existing entries to set sequence
        let sequence = if path.exists() {
            let file = File::open(&path)?;
            BufReader::new(file)
                .lines()
                .map_while(Result::ok)
                .filter(|l| !l.trim().is_empty())
                .count() as u64
        } else {
            0
        };

        Ok(Self { path, sequence })
    }

    /// Append an event to the log
    pub fn append(&mut self, event: Event) -> std::io::Result<EventRecord> {
        let record = EventRecord {
            sequence: self.sequence + 1,
            name: event.name().to_string(),
            tenant_id: event.tenant_id().clone(),
            event,
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        self.sequence = record.sequence;
        Ok(record)
    }

    /// Append everything currently queued on a receiver, returning the count
    pub fn drain(&mut self, rx: &mut EventReceiver) -> std::io::Result<usize> {
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            self.append(event)?;
            count += 1;
        }
        Ok(count)
    }

    /// Read all events from the log
    pub fn read_all(&self) -> std::io::Result<Vec<EventRecord>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: EventRecord = serde_json::from_str(&line)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            records.push(record);
        }

        Ok(records)
    }

    /// Records matching a query, oldest first
    pub fn query(&self, query: &EventQuery) -> std::io::Result<Vec<EventRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
