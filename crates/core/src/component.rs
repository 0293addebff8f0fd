// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project components (phases, deliverables)

use crate::error::{validate_amount, validate_percent, DomainError};
use crate::id::{ComponentId, ProjectId};
use serde::{Deserialize, Serialize};

/// A tracked indicator on a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub target: f64,
    pub actual: f64,
}

impl Kpi {
    /// Actual as a fraction of target, if the target is non-zero
    pub fn attainment(&self) -> Option<f64> {
        (self.target != 0.0).then(|| self.actual / self.target)
    }
}

/// A node in a project's component tree.
///
/// `progress_percent` is always the rolled value. A component with no
/// child components and no task that counts toward rollup rolls up to
/// `manual_progress`, so cancelling or hiding its last task never leaves a
/// stale derived value behind. `cost` is `own_cost` plus the rolled cost of
/// every child component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub project_id: ProjectId,
    pub parent_id: Option<ComponentId>,
    pub name: String,
    pub progress_percent: f64,
    #[serde(default)]
    pub manual_progress: f64,
    pub own_cost: f64,
    pub cost: f64,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
}

impl Component {
    pub fn new(
        id: impl Into<ComponentId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            parent_id: None,
            name: name.into(),
            progress_percent: 0.0,
            manual_progress: 0.0,
            own_cost: 0.0,
            cost: 0.0,
            kpis: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<ComponentId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_own_cost(mut self, cost: f64) -> Self {
        self.own_cost = cost;
        self.cost = cost;
        self
    }

    pub fn with_progress(mut self, percent: f64) -> Self {
        self.progress_percent = percent;
        self.manual_progress = percent;
        self
    }

    pub fn with_kpi(mut self, name: impl Into<String>, target: f64, actual: f64) -> Self {
        self.kpis.push(Kpi {
            name: name.into(),
            target,
            actual,
        });
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("component name must not be empty"));
        }
        if self.parent_id.as_ref() == Some(&self.id) {
            return Err(DomainError::validation(format!(
                "component {} cannot be its own parent",
                self.id
            )));
        }
        validate_percent("component progress", self.progress_percent)?;
        validate_percent("component progress", self.manual_progress)?;
        validate_amount("component cost", self.own_cost)
    }
}
