// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zm events`: read the audit log

use super::Context;
use crate::output;
use anyhow::Result;
use clap::Args;
use std::path::Path;
use zm_core::events::EventRecord;
use zm_core::{EventLog, EventPattern, EventQuery};

#[derive(Args)]
pub struct EventsArgs {
    /// Only events whose name matches (e.g. "Project.Baseline.*")
    #[arg(long)]
    pub pattern: Option<String>,
    /// Only events after this sequence number
    #[arg(long, default_value_t = 0)]
    pub after: u64,
}

pub fn handle(ctx: &Context, log_path: &Path, args: EventsArgs) -> Result<()> {
    let log = EventLog::open(log_path.to_path_buf())?;
    let mut query = EventQuery::tenant(ctx.actor.tenant_id.clone()).after(args.after);
    if let Some(pattern) = args.pattern.as_deref() {
        query = query.with_pattern(EventPattern::new(pattern));
    }
    let records: Vec<EventRecord> = log.query(&query)?;
    output::print_list(&records, ctx.format, "No events", |r| {
        format!(
            "{:>6} {} {:<36} project={}",
            r.sequence,
            r.event.meta().timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.name,
            r.event.project_id()
        )
    });
    Ok(())
}
