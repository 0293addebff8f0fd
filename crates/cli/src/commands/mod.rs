// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod baseline;
pub mod component;
pub mod events;
pub mod project;
pub mod task;
pub mod variance;

use crate::clock::CliClock;
use crate::output::OutputFormat;
use zm_core::{Actor, EventBus, UuidIdGen};
use zm_engine::Engine;

pub type CliEngine = Engine<EventBus, CliClock, UuidIdGen>;

/// Everything a command handler needs
pub struct Context {
    pub engine: CliEngine,
    pub actor: Actor,
    pub format: OutputFormat,
}

/// Render an optional value for text output
pub(crate) fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
