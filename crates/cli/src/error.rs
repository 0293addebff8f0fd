// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;
use zm_engine::EngineError;
use zm_storage::StorageError;

/// Error with context and recovery suggestions for display on stderr.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Describe a command failure, adding hints for known engine errors
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        match err.downcast_ref::<EngineError>() {
            Some(EngineError::NotFound { kind: "project", .. }) => CliError::new(message)
                .with_context("The project may be deleted or belong to another tenant")
                .with_suggestion("List visible projects: zm project list"),
            Some(EngineError::NotFound { kind: "baseline", .. }) => CliError::new(message)
                .with_suggestion("List the project's baselines: zm baseline list <project>"),
            Some(EngineError::Conflict(_)) => CliError::new(message)
                .with_context("Another change landed first")
                .with_suggestion("Re-read the current state and retry"),
            Some(EngineError::Timeout { .. }) => CliError::new(message)
                .with_context("Another writer is holding the lock")
                .with_suggestion("Retry, or raise [engine] operation_timeout in zm.toml"),
            Some(EngineError::Consistency(_)) => CliError::new(message)
                .with_context("Stored values are out of range; the change was not applied"),
            _ if matches!(err.downcast_ref::<StorageError>(), Some(StorageError::Locked { .. })) => {
                CliError::new(message)
                    .with_context("Another zm process has the store open")
                    .with_suggestion("Retry once it finishes, or raise [engine] operation_timeout in zm.toml")
            }
            _ => CliError::new(message),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {}
