// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zm-storage: durable state for the progress engine
//!
//! ```text
//! [Operation] → Store::commit → stage on a clone → Wal::append (fsync) → swap
//!                                                          ↓
//!                                  Wal::open → replay → MaterializedState
//! ```
//!
//! The WAL is the source of truth. One commit is one checksummed WAL
//! entry holding every operation of a mutation.

mod state;
mod store;
mod wal;

pub use state::{ApplyError, MaterializedState};
pub use store::{Store, StorageError};
pub use wal::{Wal, WalEntry, WalError};
