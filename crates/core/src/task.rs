// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state machine
//!
//! A task is the leaf unit of work that progress rolls up from.
//! Progress reports move a task forward automatically
//! (`pending → in_progress → completed`); holding, cancelling and resuming
//! are explicit user actions.

use crate::error::{validate_amount, validate_percent, DomainError};
use crate::id::{ComponentId, ProjectId, TaskId};
use crate::project::Priority;
use serde::{Deserialize, Serialize};

/// The status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::OnHold => "on_hold",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs that can change a task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskInput {
    /// Progress reported by a user or integration
    Progress { percent: f64 },
    /// Pause work (explicit)
    Hold,
    /// Abandon the task (explicit)
    Cancel,
    /// Leave `on_hold`; status is re-derived from progress
    Resume,
}

/// A status transition produced by [`Task::transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub component_id: Option<ComponentId>,
    pub name: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub progress_percent: f64,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    pub conditional_tag: Option<String>,
    /// Hidden tasks are excluded from rollup
    #[serde(default)]
    pub hidden: bool,
}

impl Task {
    /// Create a new task in the Pending state
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
    ) -> Self {
        Task {
            id: id.into(),
            project_id: project_id.into(),
            component_id: None,
            name: name.into(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            progress_percent: 0.0,
            estimated_hours: None,
            actual_hours: 0.0,
            dependencies: Vec::new(),
            conditional_tag: None,
            hidden: false,
        }
    }

    pub fn with_component(mut self, component: impl Into<ComponentId>) -> Self {
        self.component_id = Some(component.into());
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<TaskId>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_conditional_tag(mut self, tag: impl Into<String>) -> Self {
        self.conditional_tag = Some(tag.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("task name must not be empty"));
        }
        validate_percent("task progress", self.progress_percent)?;
        validate_amount("actual hours", self.actual_hours)?;
        if let Some(hours) = self.estimated_hours {
            validate_amount("estimated hours", hours)?;
        }
        if self.dependencies.contains(&self.id) {
            return Err(DomainError::validation(format!(
                "task {} cannot depend on itself",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether the task contributes to its parent's rollup
    pub fn counts_toward_rollup(&self) -> bool {
        !self.hidden && self.status != TaskStatus::Cancelled
    }

    /// Rollup weight in estimated hours, when known and positive
    pub fn hours_weight(&self) -> Option<f64> {
        self.estimated_hours.filter(|h| *h > 0.0)
    }

    /// True when every dependency is completed.
    ///
    /// `status_of` resolves a dependency id; unknown dependencies block.
    pub fn can_start(&self, status_of: impl Fn(&TaskId) -> Option<TaskStatus>) -> bool {
        self.dependencies
            .iter()
            .all(|dep| status_of(dep) == Some(TaskStatus::Completed))
    }

    /// Pure transition function - returns the new task and any status change
    pub fn transition(&self, input: TaskInput) -> Result<(Task, Option<StatusChange>), DomainError> {
        let next = match (self.status, input) {
            (_, TaskInput::Progress { percent }) => {
                validate_percent("task progress", percent)?;
                let status = match self.status {
                    TaskStatus::Pending | TaskStatus::InProgress => {
                        Self::forward_status(self.status, percent)
                    }
                    // Completed never moves backward; held and cancelled
                    // tasks only change by explicit action.
                    other => other,
                };
                Task {
                    progress_percent: percent,
                    status,
                    ..self.clone()
                }
            }

            (TaskStatus::Pending | TaskStatus::InProgress, TaskInput::Hold) => Task {
                status: TaskStatus::OnHold,
                ..self.clone()
            },

            (
                TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::OnHold,
                TaskInput::Cancel,
            ) => Task {
                status: TaskStatus::Cancelled,
                ..self.clone()
            },

            (TaskStatus::OnHold, TaskInput::Resume) => Task {
                status: Self::forward_status(TaskStatus::Pending, self.progress_percent),
                ..self.clone()
            },

            (status, input) => {
                return Err(DomainError::validation(format!(
                    "task {} cannot {} while {}",
                    self.id,
                    input.verb(),
                    status
                )));
            }
        };

        let change = (next.status != self.status).then_some(StatusChange {
            from: self.status,
            to: next.status,
        });
        Ok((next, change))
    }

    /// Status implied by progress, never moving backward from `current`
    fn forward_status(current: TaskStatus, percent: f64) -> TaskStatus {
        if percent >= 100.0 {
            TaskStatus::Completed
        } else if percent > 0.0 || current == TaskStatus::InProgress {
            TaskStatus::InProgress
        } else {
            TaskStatus::Pending
        }
    }
}

impl TaskInput {
    fn verb(&self) -> &'static str {
        match self {
            TaskInput::Progress { .. } => "report progress",
            TaskInput::Hold => "be put on hold",
            TaskInput::Cancel => "be cancelled",
            TaskInput::Resume => "be resumed",
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
