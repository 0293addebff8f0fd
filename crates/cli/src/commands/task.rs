// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task commands

use super::project::render_outcome;
use super::Context;
use crate::output;
use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use zm_core::{ComponentId, Priority, ProjectId, Task, TaskId, TaskInput};
use zm_engine::{RollupOutcome, TaskDraft};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task to a project
    Add {
        /// Project ID
        project: String,
        #[arg(long)]
        name: String,
        /// Explicit task ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Owning component
        #[arg(long)]
        component: Option<String>,
        /// Estimated hours, used as the rollup weight
        #[arg(long)]
        hours: Option<f64>,
        /// Task that must complete first (repeatable)
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
        #[arg(long, default_value = "normal")]
        priority: Priority,
        #[arg(long)]
        tag: Option<String>,
        /// Exclude the task from rollups
        #[arg(long)]
        hidden: bool,
        #[arg(long, default_value_t = 0.0)]
        progress: f64,
    },
    /// Report progress on a task
    Progress {
        project: String,
        task: String,
        percent: f64,
    },
    /// Put a task on hold
    Hold { project: String, task: String },
    /// Cancel a task
    Cancel { project: String, task: String },
    /// Resume a held task
    Resume { project: String, task: String },
    /// Record actual hours spent
    Hours {
        project: String,
        task: String,
        hours: f64,
    },
}

#[derive(Serialize)]
struct TaskChange {
    task: Task,
    rollup: RollupOutcome,
}

pub async fn handle(ctx: &Context, command: TaskCommand) -> Result<()> {
    let engine = &ctx.engine;
    let actor = &ctx.actor;
    let (task, rollup) = match command {
        TaskCommand::Add {
            project,
            name,
            id,
            component,
            hours,
            depends_on,
            priority,
            tag,
            hidden,
            progress,
        } => {
            let draft = TaskDraft {
                id: id.map(TaskId::new),
                name,
                component_id: component.map(ComponentId::new),
                priority,
                estimated_hours: hours,
                dependencies: depends_on.into_iter().map(TaskId::new).collect(),
                conditional_tag: tag,
                hidden,
                progress_percent: progress,
            };
            engine.add_task(actor, &ProjectId::new(project), draft).await?
        }
        TaskCommand::Progress {
            project,
            task,
            percent,
        } => {
            engine
                .set_task_progress(actor, &ProjectId::new(project), &TaskId::new(task), percent)
                .await?
        }
        TaskCommand::Hold { project, task } => {
            status(ctx, project, task, TaskInput::Hold).await?
        }
        TaskCommand::Cancel { project, task } => {
            status(ctx, project, task, TaskInput::Cancel).await?
        }
        TaskCommand::Resume { project, task } => {
            status(ctx, project, task, TaskInput::Resume).await?
        }
        TaskCommand::Hours {
            project,
            task,
            hours,
        } => {
            engine
                .set_task_actual_hours(actor, &ProjectId::new(project), &TaskId::new(task), hours)
                .await?
        }
    };

    let change = TaskChange { task, rollup };
    output::print(&change, ctx.format, |c| {
        format!(
            "Task {} is {} at {:.2}%\n{}",
            c.task.id,
            c.task.status,
            c.task.progress_percent,
            render_outcome(&c.rollup)
        )
    });
    Ok(())
}

async fn status(
    ctx: &Context,
    project: String,
    task: String,
    input: TaskInput,
) -> Result<(Task, RollupOutcome)> {
    Ok(ctx
        .engine
        .set_task_status(&ctx.actor, &ProjectId::new(project), &TaskId::new(task), input)
        .await?)
}
