// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zm variance`

use super::{or_dash, Context};
use crate::output;
use anyhow::Result;
use clap::Args;
use zm_core::{BaselineId, BaselineType, ProjectId, VarianceResult};

#[derive(Args)]
pub struct VarianceArgs {
    /// Project ID
    pub project: String,
    /// Measure against this baseline
    #[arg(long, conflicts_with = "baseline_type")]
    pub baseline: Option<String>,
    /// Measure against the active baseline of this type
    #[arg(long = "type", default_value = "execution")]
    pub baseline_type: BaselineType,
}

pub fn handle(ctx: &Context, args: VarianceArgs) -> Result<()> {
    let project = ProjectId::new(args.project);
    let result = match args.baseline {
        Some(id) => ctx
            .engine
            .compute_variance(&ctx.actor, &project, &BaselineId::new(id))?,
        None => ctx
            .engine
            .compute_active_variance(&ctx.actor, &project, args.baseline_type)?,
    };
    output::print(&result, ctx.format, render);
    Ok(())
}

fn render(v: &VarianceResult) -> String {
    let ev = &v.earned_value_data;
    let mut lines = vec![
        format!(
            "Variance of {} vs {} v{} as of {}",
            v.project_id, v.baseline_type, v.baseline_version, v.as_of
        ),
        format!("  Health: {}", v.overall_health),
        format!(
            "  PV {:.2}  EV {:.2}  AC {:.2}  BAC {:.2}",
            ev.planned_value, ev.earned_value, ev.actual_cost, ev.budget_at_completion
        ),
        format!(
            "  Schedule: {:.2} ({} days), SPI {}",
            v.schedule_variance.amount,
            v.schedule_variance.days,
            index(v.schedule_variance.spi)
        ),
        format!(
            "  Cost: {:.2} ({}%), CPI {}",
            v.cost_variance.amount,
            or_dash(v.cost_variance.percent.map(|p| format!("{:.2}", p))),
            index(v.cost_variance.cpi)
        ),
        format!(
            "  EAC {:.2}  ETC {:.2}  VAC {:.2}",
            ev.estimate_at_completion, ev.estimate_to_complete, ev.variance_at_completion
        ),
    ];
    for r in &v.recommendations {
        lines.push(format!("  - {}", r));
    }
    lines.join("\n")
}

fn index(value: Option<f64>) -> String {
    or_dash(value.map(|i| format!("{:.3}", i)))
}
