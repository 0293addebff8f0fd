// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall clock, optionally pinned to a calendar date

use chrono::{DateTime, NaiveDate, Utc};
use zm_core::{Clock, SystemClock};

/// The clock the CLI runs the engine with.
///
/// Pinning (`--today` / `ZM_TODAY`) fixes the variance as-of date so that
/// reports are reproducible.
#[derive(Clone)]
pub enum CliClock {
    System(SystemClock),
    Pinned(DateTime<Utc>),
}

impl CliClock {
    pub fn new(today: Option<NaiveDate>) -> Self {
        match today.and_then(|d| d.and_hms_opt(12, 0, 0)) {
            Some(noon) => CliClock::Pinned(noon.and_utc()),
            None => CliClock::System(SystemClock),
        }
    }
}

impl Clock for CliClock {
    fn now(&self) -> DateTime<Utc> {
        match self {
            CliClock::System(clock) => clock.now(),
            CliClock::Pinned(at) => *at,
        }
    }
}
