// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project aggregate
//!
//! A project's progress and cost are derived values. They change only
//! through [`Project::apply_rollup`], which also bumps the optimistic
//! `version` used to detect lost updates.

use crate::error::{validate_amount, DomainError};
use crate::id::{ActorId, ProjectId, TenantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl std::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(DomainError::validation(format!(
                "invalid priority '{}': expected low, normal, high or urgent",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub tenant_id: TenantId,
    pub name: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: f64,
    pub owner_id: ActorId,
    /// Soft-deleted projects are invisible to every operation
    pub deleted: bool,
    progress_percent: f64,
    cost: f64,
    version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        id: impl Into<ProjectId>,
        tenant_id: impl Into<TenantId>,
        name: impl Into<String>,
        owner_id: impl Into<ActorId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            status: ProjectStatus::default(),
            priority: Priority::default(),
            start_date: None,
            end_date: None,
            budget: 0.0,
            owner_id: owner_id.into(),
            deleted: false,
            progress_percent: 0.0,
            cost: 0.0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("project name must not be empty"));
        }
        validate_amount("budget", self.budget)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(DomainError::validation(format!(
                    "project end date {} is before start date {}",
                    end, start
                )));
            }
        }
        Ok(())
    }

    /// Rolled-up completion percentage in [0, 100]
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// Rolled-up actual cost
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Optimistic concurrency counter, incremented by every rollup write
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the project exists for the given tenant
    pub fn is_visible_to(&self, tenant_id: &TenantId) -> bool {
        !self.deleted && &self.tenant_id == tenant_id
    }

    /// Store the result of a rollup
    pub fn apply_rollup(&mut self, progress_percent: f64, cost: f64, at: DateTime<Utc>) {
        self.progress_percent = progress_percent;
        self.cost = cost;
        self.version += 1;
        self.updated_at = at;
    }
}
