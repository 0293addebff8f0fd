// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events published after every committed change
//!
//! Each variant carries one payload struct. Payload keys are camelCase and
//! every payload has the acting user, the tenant and an ISO-8601 timestamp
//! (see [`EventMeta`]). Event names are dotted, `Project.<Entity>.<Action>`.

use crate::actor::Actor;
use crate::baseline::{BaselineComparison, BaselineType, FieldChange, VersionDirection};
use crate::id::{ActorId, BaselineId, ComponentId, ProjectId, TaskId, TenantId};
use crate::task::TaskStatus;
use crate::variance::VarianceResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ROLLUP_UPDATED: &str = "Project.Project.RollupUpdated";
pub const BASELINE_CREATED: &str = "Project.Baseline.Created";
pub const BASELINE_UPDATED: &str = "Project.Baseline.Updated";
pub const BASELINE_REBASELINED: &str = "Project.Baseline.Rebaselined";
pub const BASELINE_COMPARED: &str = "Project.Baseline.Compared";
pub const VARIANCE_UPDATED: &str = "Project.Variance.Updated";
pub const COMPONENT_PROGRESS_UPDATED: &str = "Project.Component.ProgressUpdated";
pub const COMPONENT_COST_UPDATED: &str = "Project.Component.CostUpdated";
pub const TASK_STATUS_CHANGED: &str = "Project.Task.StatusChanged";

/// Who, for which tenant, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    pub timestamp: DateTime<Utc>,
}

impl EventMeta {
    pub fn new(actor: &Actor, timestamp: DateTime<Utc>) -> Self {
        Self {
            actor_id: actor.id.clone(),
            tenant_id: actor.tenant_id.clone(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupUpdated {
    pub project_id: ProjectId,
    pub trigger_kind: String,
    pub trigger_id: Option<String>,
    pub old_progress: f64,
    pub new_progress: f64,
    pub old_cost: f64,
    pub new_cost: f64,
    pub affected_component_ids: Vec<ComponentId>,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineCreated {
    pub project_id: ProjectId,
    pub baseline_id: BaselineId,
    pub baseline_type: BaselineType,
    pub version: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub planned_cost: f64,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineUpdated {
    pub project_id: ProjectId,
    pub baseline_id: BaselineId,
    pub baseline_type: BaselineType,
    pub version: u32,
    pub changed_fields: Vec<String>,
    pub changes: BTreeMap<String, FieldChange>,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRebaselined {
    pub project_id: ProjectId,
    pub baseline_type: BaselineType,
    pub old_baseline_id: BaselineId,
    pub new_baseline_id: BaselineId,
    pub old_version: u32,
    pub new_version: u32,
    pub direction: VersionDirection,
    pub reason: String,
    /// Variance against the outgoing baseline, when it could be computed
    pub variance_data: Option<VarianceResult>,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineCompared {
    #[serde(flatten)]
    pub comparison: BaselineComparison,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceUpdated {
    pub project_id: ProjectId,
    pub baseline_id: BaselineId,
    pub variance_data: VarianceResult,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProgressUpdated {
    pub project_id: ProjectId,
    pub component_id: ComponentId,
    pub old_progress: f64,
    pub new_progress: f64,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCostUpdated {
    pub project_id: ProjectId,
    pub component_id: ComponentId,
    pub old_cost: f64,
    pub new_cost: f64,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusChanged {
    pub project_id: ProjectId,
    pub task_id: TaskId,
    pub component_id: Option<ComponentId>,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    #[serde(rename = "Project.Project.RollupUpdated")]
    RollupUpdated(RollupUpdated),
    #[serde(rename = "Project.Baseline.Created")]
    BaselineCreated(BaselineCreated),
    #[serde(rename = "Project.Baseline.Updated")]
    BaselineUpdated(BaselineUpdated),
    #[serde(rename = "Project.Baseline.Rebaselined")]
    BaselineRebaselined(BaselineRebaselined),
    #[serde(rename = "Project.Baseline.Compared")]
    BaselineCompared(BaselineCompared),
    #[serde(rename = "Project.Variance.Updated")]
    VarianceUpdated(VarianceUpdated),
    #[serde(rename = "Project.Component.ProgressUpdated")]
    ComponentProgressUpdated(ComponentProgressUpdated),
    #[serde(rename = "Project.Component.CostUpdated")]
    ComponentCostUpdated(ComponentCostUpdated),
    #[serde(rename = "Project.Task.StatusChanged")]
    TaskStatusChanged(TaskStatusChanged),
}

impl Event {
    /// Dotted event name used for subscription matching
    pub fn name(&self) -> &'static str {
        match self {
            Event::RollupUpdated(_) => ROLLUP_UPDATED,
            Event::BaselineCreated(_) => BASELINE_CREATED,
            Event::BaselineUpdated(_) => BASELINE_UPDATED,
            Event::BaselineRebaselined(_) => BASELINE_REBASELINED,
            Event::BaselineCompared(_) => BASELINE_COMPARED,
            Event::VarianceUpdated(_) => VARIANCE_UPDATED,
            Event::ComponentProgressUpdated(_) => COMPONENT_PROGRESS_UPDATED,
            Event::ComponentCostUpdated(_) => COMPONENT_COST_UPDATED,
            Event::TaskStatusChanged(_) => TASK_STATUS_CHANGED,
        }
    }

    pub fn meta(&self) -> &EventMeta {
        match self {
            Event::RollupUpdated(e) => &e.meta,
            Event::BaselineCreated(e) => &e.meta,
            Event::BaselineUpdated(e) => &e.meta,
            Event::BaselineRebaselined(e) => &e.meta,
            Event::BaselineCompared(e) => &e.meta,
            Event::VarianceUpdated(e) => &e.meta,
            Event::ComponentProgressUpdated(e) => &e.meta,
            Event::ComponentCostUpdated(e) => &e.meta,
            Event::TaskStatusChanged(e) => &e.meta,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.meta().tenant_id
    }

    pub fn project_id(&self) -> &ProjectId {
        match self {
            Event::RollupUpdated(e) => &e.project_id,
            Event::BaselineCreated(e) => &e.project_id,
            Event::BaselineUpdated(e) => &e.project_id,
            Event::BaselineRebaselined(e) => &e.project_id,
            Event::BaselineCompared(e) => &e.comparison.project_id,
            Event::VarianceUpdated(e) => &e.project_id,
            Event::ComponentProgressUpdated(e) => &e.project_id,
            Event::ComponentCostUpdated(e) => &e.project_id,
            Event::TaskStatusChanged(e) => &e.project_id,
        }
    }

    /// The payload as a flat JSON object, the shape delivered to consumers
    pub fn payload(&self) -> serde_json::Map<String, serde_json::Value> {
        let value = match self {
            Event::RollupUpdated(e) => serde_json::to_value(e),
            Event::BaselineCreated(e) => serde_json::to_value(e),
            Event::BaselineUpdated(e) => serde_json::to_value(e),
            Event::BaselineRebaselined(e) => serde_json::to_value(e),
            Event::BaselineCompared(e) => serde_json::to_value(e),
            Event::VarianceUpdated(e) => serde_json::to_value(e),
            Event::ComponentProgressUpdated(e) => serde_json::to_value(e),
            Event::ComponentCostUpdated(e) => serde_json::to_value(e),
            Event::TaskStatusChanged(e) => serde_json::to_value(e),
        };
        match value {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }

    /// One-line human summary for logs and CLI output
    pub fn log_summary(&self) -> String {
        let project = self.project_id();
        match self {
            Event::RollupUpdated(e) => format!(
                "{} project={} progress={}->{} cost={}->{}",
                self.name(),
                project,
                e.old_progress,
                e.new_progress,
                e.old_cost,
                e.new_cost
            ),
            Event::BaselineCreated(e) => format!(
                "{} project={} {} v{}",
                self.name(),
                project,
                e.baseline_type,
                e.version
            ),
            Event::BaselineUpdated(e) => format!(
                "{} project={} baseline={} fields={}",
                self.name(),
                project,
                e.baseline_id,
                e.changed_fields.join(",")
            ),
            Event::BaselineRebaselined(e) => format!(
                "{} project={} {} v{}->v{}",
                self.name(),
                project,
                e.baseline_type,
                e.old_version,
                e.new_version
            ),
            Event::BaselineCompared(e) => format!(
                "{} project={} v{}<->v{}",
                self.name(),
                project,
                e.comparison.version1,
                e.comparison.version2
            ),
            Event::VarianceUpdated(e) => format!(
                "{} project={} baseline={} health={}",
                self.name(),
                project,
                e.baseline_id,
                e.variance_data.overall_health
            ),
            Event::ComponentProgressUpdated(e) => format!(
                "{} project={} component={} progress={}->{}",
                self.name(),
                project,
                e.component_id,
                e.old_progress,
                e.new_progress
            ),
            Event::ComponentCostUpdated(e) => format!(
                "{} project={} component={} cost={}->{}",
                self.name(),
                project,
                e.component_id,
                e.old_cost,
                e.new_cost
            ),
            Event::TaskStatusChanged(e) => format!(
                "{} project={} task={} {}->{}",
                self.name(),
                project,
                e.task_id,
                e.old_status,
                e.new_status
            ),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
