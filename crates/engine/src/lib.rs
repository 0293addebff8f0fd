// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ZenaManage progress engine
//!
//! The in-process service behind the project progress, baseline and
//! variance operations. Callers pass an [`zm_core::Actor`] to every
//! operation; data of other tenants is reported as not found.

mod baselines;
mod error;
mod locks;
mod progress;
mod runtime;
mod variance;

#[cfg(test)]
mod test_helpers;

pub use baselines::RebaselineOutcome;
pub use error::EngineError;
pub use locks::{LockGuard, LockTable};
pub use progress::{ComponentDraft, ProjectDraft, RollupOutcome, TaskDraft};
pub use runtime::{Engine, EngineDeps};
