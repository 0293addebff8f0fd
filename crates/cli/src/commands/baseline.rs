// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Baseline commands

use super::{or_dash, Context};
use crate::output;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use zm_core::{
    Baseline, BaselineComparison, BaselineHistory, BaselineId, BaselineType, BaselineUpdate,
    PlanData, PlanPoint, ProjectId,
};
use zm_engine::RebaselineOutcome;

#[derive(Subcommand)]
pub enum BaselineCommand {
    /// Create a baseline; it becomes the active one for its type
    Create {
        project: String,
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long)]
        note: Option<String>,
    },
    /// Edit an unlocked baseline
    Update {
        id: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        cost: Option<f64>,
        /// Replace the planned curve (DATE=PERCENT, repeatable)
        #[arg(long = "point", value_parser = parse_point)]
        points: Vec<PlanPoint>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Lock a baseline against further edits
    Finalize { id: String },
    /// Replace the active baseline with a new version
    Rebaseline {
        project: String,
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long)]
        reason: String,
        /// Fail with a conflict unless this is still the active version
        #[arg(long)]
        expected_version: Option<u32>,
    },
    /// Make an older version active again
    Revert {
        project: String,
        #[arg(long = "type", default_value = "execution")]
        baseline_type: BaselineType,
        #[arg(long)]
        to: u32,
        #[arg(long)]
        reason: String,
    },
    /// Compare two baselines of the same project and type
    Compare { first: String, second: String },
    /// List every baseline version of a project
    List { project: String },
    /// Show the active baseline of a type
    Active {
        project: String,
        #[arg(long = "type", default_value = "execution")]
        baseline_type: BaselineType,
    },
    /// Show the re-baseline history of a project
    History { project: String },
}

#[derive(Args)]
pub struct PlanArgs {
    /// contract or execution
    #[arg(long = "type", default_value = "execution")]
    pub baseline_type: BaselineType,
    #[arg(long)]
    pub start: NaiveDate,
    #[arg(long)]
    pub end: NaiveDate,
    /// Planned cost (budget at completion)
    #[arg(long)]
    pub cost: f64,
    /// Intermediate point on the planned curve (DATE=PERCENT, repeatable)
    #[arg(long = "point", value_parser = parse_point)]
    pub points: Vec<PlanPoint>,
}

impl PlanArgs {
    fn plan(&self) -> PlanData {
        PlanData {
            start_date: self.start,
            end_date: self.end,
            planned_cost: self.cost,
            curve: self.points.clone(),
        }
    }
}

fn parse_point(s: &str) -> Result<PlanPoint, String> {
    let (date, percent) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DATE=PERCENT, got '{}'", s))?;
    let date = date
        .trim()
        .parse::<NaiveDate>()
        .map_err(|e| format!("invalid date '{}': {}", date, e))?;
    let planned_percent = percent
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid percent '{}': {}", percent, e))?;
    Ok(PlanPoint {
        date,
        planned_percent,
    })
}

pub async fn handle(ctx: &Context, command: BaselineCommand) -> Result<()> {
    let engine = &ctx.engine;
    let actor = &ctx.actor;
    match command {
        BaselineCommand::Create {
            project,
            plan,
            note,
        } => {
            let baseline = engine
                .create_baseline(
                    actor,
                    &ProjectId::new(project),
                    plan.baseline_type,
                    plan.plan(),
                    note,
                )
                .await?;
            output::print(&baseline, ctx.format, |b| {
                format!("Created {} baseline {} v{}", b.baseline_type, b.id, b.version)
            });
        }

        BaselineCommand::Update {
            id,
            start,
            end,
            cost,
            points,
            note,
        } => {
            let update = BaselineUpdate {
                start_date: start,
                end_date: end,
                planned_cost: cost,
                curve: (!points.is_empty()).then_some(points),
                note,
            };
            let baseline = engine
                .update_baseline(actor, &BaselineId::new(id), update)
                .await?;
            output::print(&baseline, ctx.format, render_baseline);
        }

        BaselineCommand::Finalize { id } => {
            let baseline = engine
                .finalize_baseline(actor, &BaselineId::new(id))
                .await?;
            output::print(&baseline, ctx.format, |b| {
                format!("Baseline {} v{} is locked", b.id, b.version)
            });
        }

        BaselineCommand::Rebaseline {
            project,
            plan,
            reason,
            expected_version,
        } => {
            let outcome = engine
                .rebaseline_project(
                    actor,
                    &ProjectId::new(project),
                    plan.baseline_type,
                    &reason,
                    plan.plan(),
                    expected_version,
                )
                .await?;
            output::print(&outcome, ctx.format, render_transition);
        }

        BaselineCommand::Revert {
            project,
            baseline_type,
            to,
            reason,
        } => {
            let outcome = engine
                .revert_baseline(actor, &ProjectId::new(project), baseline_type, to, &reason)
                .await?;
            output::print(&outcome, ctx.format, render_transition);
        }

        BaselineCommand::Compare { first, second } => {
            let comparison = engine.compare_baselines(
                actor,
                &BaselineId::new(first),
                &BaselineId::new(second),
            )?;
            output::print(&comparison, ctx.format, render_comparison);
        }

        BaselineCommand::List { project } => {
            let baselines = engine.list_baselines(actor, &ProjectId::new(project))?;
            output::print_list(&baselines, ctx.format, "No baselines", summary);
        }

        BaselineCommand::Active {
            project,
            baseline_type,
        } => {
            let active = engine.active_baseline(actor, &ProjectId::new(project), baseline_type)?;
            match &active {
                Some(baseline) => output::print(baseline, ctx.format, render_baseline),
                None => output::print(&active, ctx.format, |_| {
                    format!("No active {} baseline", baseline_type)
                }),
            }
        }

        BaselineCommand::History { project } => {
            let history = engine.baseline_history(actor, &ProjectId::new(project))?;
            output::print_list(&history, ctx.format, "No re-baseline history", history_line);
        }
    }
    Ok(())
}

fn summary(b: &Baseline) -> String {
    format!(
        "{:<24} {:<10} v{:<3} {} .. {} cost {:.2}{}",
        b.id,
        b.baseline_type,
        b.version,
        b.plan.start_date,
        b.plan.end_date,
        b.plan.planned_cost,
        if b.locked { " [locked]" } else { "" }
    )
}

fn render_baseline(b: &Baseline) -> String {
    let mut lines = vec![
        format!("Baseline: {} ({} v{})", b.id, b.baseline_type, b.version),
        format!("  Plan: {} .. {}", b.plan.start_date, b.plan.end_date),
        format!("  Planned cost: {:.2}", b.plan.planned_cost),
        format!("  Locked: {}", b.locked),
        format!("  Note: {}", or_dash(b.note.as_ref())),
    ];
    for point in &b.plan.curve {
        lines.push(format!("  {} -> {:.2}%", point.date, point.planned_percent));
    }
    lines.join("\n")
}

fn render_transition(outcome: &RebaselineOutcome) -> String {
    let h = &outcome.history;
    format!(
        "{} baseline v{} -> v{} ({})\nvariance vs v{} at transition: {}",
        h.baseline_type,
        h.from_version,
        h.to_version,
        outcome.baseline.id,
        outcome.variance.baseline_version,
        outcome.variance.overall_health
    )
}

fn render_comparison(c: &BaselineComparison) -> String {
    [
        format!("{} v{} vs v{}", c.baseline_type, c.version1, c.version2),
        format!("  Start shift: {} days", c.start_shift_days),
        format!("  End shift: {} days", c.end_shift_days),
        format!("  Duration delta: {} days", c.duration_delta_days),
        format!(
            "  Cost delta: {:.2} ({}%)",
            c.planned_cost_delta,
            or_dash(c.planned_cost_delta_percent.map(|p| format!("{:.2}", p)))
        ),
        format!("  Changed: {}", c.changed_fields.join(", ")),
    ]
    .join("\n")
}

fn history_line(h: &BaselineHistory) -> String {
    format!(
        "{} {:<10} v{} -> v{} by {}: {}",
        h.created_at.format("%Y-%m-%d %H:%M"),
        h.baseline_type,
        h.from_version,
        h.to_version,
        h.created_by,
        h.note
    )
}
