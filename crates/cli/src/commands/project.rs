// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project commands and the manual rollup

use super::{or_dash, Context};
use crate::output;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use zm_core::{Component, Priority, Project, ProjectId, RollupTrigger, Task};
use zm_engine::{ProjectDraft, RollupOutcome};

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Create(CreateArgs),
    /// List projects of the current tenant
    List,
    /// Show a project with its components and tasks
    Show {
        /// Project ID
        id: String,
    },
    /// Soft-delete a project
    Delete {
        /// Project ID
        id: String,
    },
}

#[derive(Args)]
pub struct CreateArgs {
    /// Project name
    #[arg(long)]
    pub name: String,
    /// Explicit project ID (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value_t = 0.0)]
    pub budget: f64,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// low, normal, high or urgent
    #[arg(long, default_value = "normal")]
    pub priority: Priority,
}

#[derive(Serialize)]
struct ProjectView {
    project: Project,
    components: Vec<Component>,
    tasks: Vec<Task>,
}

pub async fn handle(ctx: &Context, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Create(args) => {
            let project = ctx
                .engine
                .create_project(
                    &ctx.actor,
                    ProjectDraft {
                        id: args.id.map(ProjectId::new),
                        name: args.name,
                        budget: args.budget,
                        start_date: args.start,
                        end_date: args.end,
                        priority: args.priority,
                        ..ProjectDraft::default()
                    },
                )
                .await?;
            output::print(&project, ctx.format, |p| format!("Created project {}", p.id));
        }

        ProjectCommand::List => {
            let projects = ctx.engine.list_projects(&ctx.actor);
            output::print_list(&projects, ctx.format, "No projects", summary);
        }

        ProjectCommand::Show { id } => {
            let id = ProjectId::new(id);
            let project = ctx.engine.get_project(&ctx.actor, &id)?;
            let tree = ctx.engine.project_tree(&ctx.actor, &id)?;
            let view = ProjectView {
                project,
                components: tree.components().cloned().collect(),
                tasks: tree.tasks().cloned().collect(),
            };
            output::print(&view, ctx.format, render_view);
        }

        ProjectCommand::Delete { id } => {
            let id = ProjectId::new(id);
            ctx.engine.delete_project(&ctx.actor, &id).await?;
            if ctx.format == output::OutputFormat::Text {
                println!("Deleted project {}", id);
            }
        }
    }
    Ok(())
}

/// `zm rollup <project>`
pub async fn rollup(ctx: &Context, project: String) -> Result<()> {
    let outcome = ctx
        .engine
        .recompute_project_rollup(&ctx.actor, &ProjectId::new(project), RollupTrigger::Manual)
        .await?;
    output::print(&outcome, ctx.format, render_outcome);
    Ok(())
}

pub(crate) fn render_outcome(outcome: &RollupOutcome) -> String {
    let r = &outcome.rollup;
    let mut out = format!(
        "progress {:.2}% -> {:.2}%, cost {:.2} -> {:.2}",
        r.old_progress, r.new_progress, r.old_cost, r.new_cost
    );
    if !outcome.significant {
        out.push_str(" (below threshold, no event)");
    }
    for v in &outcome.variances {
        out.push_str(&format!(
            "\nvariance vs {} v{}: {}",
            v.baseline_type, v.baseline_version, v.overall_health
        ));
    }
    out
}

fn summary(p: &Project) -> String {
    format!(
        "{:<24} {:<24} {:>7.2}% {:>12.2} v{}",
        p.id,
        p.name,
        p.progress_percent(),
        p.cost(),
        p.version()
    )
}

fn render_view(view: &ProjectView) -> String {
    let p = &view.project;
    let mut lines = vec![
        format!("Project: {} ({})", p.id, p.name),
        format!("  Progress: {:.2}%", p.progress_percent()),
        format!("  Cost: {:.2} of budget {:.2}", p.cost(), p.budget),
        format!("  Dates: {} .. {}", or_dash(p.start_date), or_dash(p.end_date)),
        format!("  Version: {}", p.version()),
    ];
    if !view.components.is_empty() {
        lines.push("Components:".to_string());
        for c in &view.components {
            lines.push(format!(
                "  {:<20} parent={:<20} {:>7.2}% cost {:.2}",
                c.id,
                or_dash(c.parent_id.as_ref()),
                c.progress_percent,
                c.cost
            ));
        }
    }
    if !view.tasks.is_empty() {
        lines.push("Tasks:".to_string());
        for t in &view.tasks {
            lines.push(format!(
                "  {:<20} {:<12} {:>7.2}% component={}",
                t.id,
                t.status,
                t.progress_percent,
                or_dash(t.component_id.as_ref())
            ));
        }
    }
    lines.join("\n")
}
