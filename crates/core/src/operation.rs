// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log
//!
//! Every state change is expressed as a sequence of operations. The engine
//! builds the full sequence for one mutation and storage commits it as a
//! single WAL entry, so a mutation either lands completely or not at all.

use crate::baseline::{Baseline, BaselineHistory, BaselineType};
use crate::component::Component;
use crate::id::{BaselineId, ComponentId, ProjectId};
use crate::project::Project;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolled values written back onto one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentValues {
    pub id: ComponentId,
    pub progress_percent: f64,
    pub cost: f64,
}

/// Operations that can be persisted to the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new project
    ProjectCreate { project: Project },

    /// Soft-delete a project
    ProjectDelete { id: ProjectId, at: DateTime<Utc> },

    /// Insert a component, or replace one with the same id and parent
    ComponentUpsert { component: Component },

    /// Move a component under a new parent (or to the root)
    ComponentReparent {
        project_id: ProjectId,
        id: ComponentId,
        parent_id: Option<ComponentId>,
    },

    /// Insert or replace a task
    TaskUpsert { task: Task },

    /// Store a rollup; rejected unless the project is still at `expected_version`
    RollupApply {
        project_id: ProjectId,
        expected_version: u64,
        progress_percent: f64,
        cost: f64,
        components: Vec<ComponentValues>,
        at: DateTime<Utc>,
    },

    /// Add a new baseline version
    BaselineInsert { baseline: Baseline },

    /// Replace an existing baseline (update, lock)
    BaselineReplace { baseline: Baseline },

    /// Make a baseline the active one for its (project, type)
    BaselineActivate {
        project_id: ProjectId,
        baseline_type: BaselineType,
        baseline_id: BaselineId,
    },

    /// Append a re-baseline history row
    HistoryAppend { history: BaselineHistory },
}

impl Operation {
    /// Project touched by this operation
    pub fn project_id(&self) -> &ProjectId {
        match self {
            Operation::ProjectCreate { project } => &project.id,
            Operation::ProjectDelete { id, .. } => id,
            Operation::ComponentUpsert { component } => &component.project_id,
            Operation::ComponentReparent { project_id, .. } => project_id,
            Operation::TaskUpsert { task } => &task.project_id,
            Operation::RollupApply { project_id, .. } => project_id,
            Operation::BaselineInsert { baseline } => &baseline.project_id,
            Operation::BaselineReplace { baseline } => &baseline.project_id,
            Operation::BaselineActivate { project_id, .. } => project_id,
            Operation::HistoryAppend { history } => &history.project_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::ProjectCreate { .. } => "project_create",
            Operation::ProjectDelete { .. } => "project_delete",
            Operation::ComponentUpsert { .. } => "component_upsert",
            Operation::ComponentReparent { .. } => "component_reparent",
            Operation::TaskUpsert { .. } => "task_upsert",
            Operation::RollupApply { .. } => "rollup_apply",
            Operation::BaselineInsert { .. } => "baseline_insert",
            Operation::BaselineReplace { .. } => "baseline_replace",
            Operation::BaselineActivate { .. } => "baseline_activate",
            Operation::HistoryAppend { .. } => "history_append",
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
