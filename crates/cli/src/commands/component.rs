// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component commands

use super::project::render_outcome;
use super::Context;
use crate::output;
use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use zm_core::{Component, ComponentId, ProjectId};
use zm_engine::{ComponentDraft, RollupOutcome};

#[derive(Subcommand)]
pub enum ComponentCommand {
    /// Add a component to a project
    Add {
        /// Project ID
        project: String,
        #[arg(long)]
        name: String,
        /// Explicit component ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Parent component ID; root when omitted
        #[arg(long)]
        parent: Option<String>,
        /// Own cost, excluding children
        #[arg(long, default_value_t = 0.0)]
        cost: f64,
        #[arg(long, default_value_t = 0.0)]
        progress: f64,
    },
    /// Move a component under another parent
    Move {
        project: String,
        component: String,
        /// New parent; moves to the root when omitted
        #[arg(long)]
        parent: Option<String>,
    },
    /// Set progress on a component without tasks or children
    Progress {
        project: String,
        component: String,
        percent: f64,
    },
    /// Set a component's own cost
    Cost {
        project: String,
        component: String,
        amount: f64,
    },
}

#[derive(Serialize)]
struct ComponentChange {
    component: Component,
    rollup: RollupOutcome,
}

pub async fn handle(ctx: &Context, command: ComponentCommand) -> Result<()> {
    let (verb, (component, rollup)) = match command {
        ComponentCommand::Add {
            project,
            name,
            id,
            parent,
            cost,
            progress,
        } => {
            let draft = ComponentDraft {
                id: id.map(ComponentId::new),
                name,
                parent_id: parent.map(ComponentId::new),
                own_cost: cost,
                progress_percent: progress,
            };
            let change = ctx
                .engine
                .add_component(&ctx.actor, &ProjectId::new(project), draft)
                .await?;
            ("Added", change)
        }
        ComponentCommand::Move {
            project,
            component,
            parent,
        } => {
            let change = ctx
                .engine
                .reparent_component(
                    &ctx.actor,
                    &ProjectId::new(project),
                    &ComponentId::new(component),
                    parent.map(ComponentId::new),
                )
                .await?;
            ("Moved", change)
        }
        ComponentCommand::Progress {
            project,
            component,
            percent,
        } => {
            let change = ctx
                .engine
                .set_component_progress(
                    &ctx.actor,
                    &ProjectId::new(project),
                    &ComponentId::new(component),
                    percent,
                )
                .await?;
            ("Updated", change)
        }
        ComponentCommand::Cost {
            project,
            component,
            amount,
        } => {
            let change = ctx
                .engine
                .set_component_cost(
                    &ctx.actor,
                    &ProjectId::new(project),
                    &ComponentId::new(component),
                    amount,
                )
                .await?;
            ("Updated", change)
        }
    };

    let change = ComponentChange { component, rollup };
    output::print(&change, ctx.format, |c| {
        format!(
            "{} component {}\n{}",
            verb,
            c.component.id,
            render_outcome(&c.rollup)
        )
    });
    Ok(())
}
