// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain error taxonomy shared by the pure calculators

use thiserror::Error;

/// Errors raised by domain validation and the rollup/variance calculators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// A computed value is impossible (negative cost, NaN progress).
    /// Indicates a data or programming bug; the mutation must be aborted.
    #[error("consistency violation: {0}")]
    Consistency(String),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Check that a percentage lies in [0, 100] and is a real number
pub fn validate_percent(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(DomainError::validation(format!(
            "{} must be between 0 and 100, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Check that an amount is a real, non-negative number
pub fn validate_amount(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}
