// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use std::time::Duration;
use thiserror::Error;
use zm_core::DomainError;
use zm_storage::{ApplyError, StorageError};

/// Errors returned by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("consistency violation: {0}")]
    Consistency(String),
    #[error("{operation} timed out after {after:?} waiting for a lock")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the same call may succeed if simply retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict(_) | EngineError::Timeout { .. })
    }
}

impl From<DomainError> for EngineError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { kind, id } => EngineError::NotFound { kind, id },
            DomainError::Validation(msg) => EngineError::Validation(msg),
            DomainError::Conflict(msg) => EngineError::Conflict(msg),
            DomainError::Consistency(msg) => EngineError::Consistency(msg),
        }
    }
}

impl From<ApplyError> for EngineError {
    fn from(e: ApplyError) -> Self {
        match e {
            ApplyError::NotFound { kind, id } => EngineError::NotFound { kind, id },
            ApplyError::AlreadyExists { .. } | ApplyError::VersionMismatch { .. } => {
                EngineError::Conflict(e.to_string())
            }
            ApplyError::Domain(d) => d.into(),
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Rejected { source, .. } => source.into(),
            other => EngineError::Storage(other),
        }
    }
}
