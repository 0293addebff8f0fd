// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event delivery and audit
//!
//! This module provides:
//! - `Publisher` - The seam the engine publishes committed events through
//! - `EventBus` - Route events to matching, optionally tenant-scoped, subscribers
//! - `EventLog` - Append-only JSONL audit trail of published events
//! - `EventPattern` - Dotted-name pattern matching for subscriptions

mod bus;
mod log;
mod subscription;

pub use bus::{EventBus, EventReceiver, EventSender, Publisher};
pub use log::{EventLog, EventQuery, EventRecord};
pub use subscription::{EventPattern, SubscriberId, Subscription};
