// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Baselines: versioned snapshots of planned schedule and cost
//!
//! Versions are assigned per (project, type) and are never reused. A
//! baseline stays editable until it is locked, either explicitly or by
//! being superseded through a re-baseline. Re-baseline transitions are
//! recorded as append-only [`BaselineHistory`] rows.

use crate::error::{validate_amount, validate_percent, DomainError};
use crate::id::{ActorId, BaselineId, HistoryId, ProjectId, TenantId};
use crate::project::Project;
use crate::rollup::round_to;
use crate::variance::VarianceResult;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineType {
    Contract,
    Execution,
}

impl BaselineType {
    pub const ALL: [BaselineType; 2] = [BaselineType::Contract, BaselineType::Execution];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineType::Contract => "contract",
            BaselineType::Execution => "execution",
        }
    }
}

impl std::fmt::Display for BaselineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BaselineType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract" => Ok(BaselineType::Contract),
            "execution" => Ok(BaselineType::Execution),
            other => Err(DomainError::validation(format!(
                "invalid baseline type '{}': expected contract or execution",
                other
            ))),
        }
    }
}

/// A point on the planned progress curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPoint {
    pub date: NaiveDate,
    pub planned_percent: f64,
}

/// Planned schedule and cost.
///
/// The curve is implicitly anchored at `(start_date, 0%)` and
/// `(end_date, 100%)`; intermediate points shape it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Budget at completion
    pub planned_cost: f64,
    #[serde(default)]
    pub curve: Vec<PlanPoint>,
}

impl PlanData {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, planned_cost: f64) -> Self {
        Self {
            start_date,
            end_date,
            planned_cost,
            curve: Vec::new(),
        }
    }

    pub fn with_point(mut self, date: NaiveDate, planned_percent: f64) -> Self {
        self.curve.push(PlanPoint {
            date,
            planned_percent,
        });
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::validation(format!(
                "plan end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        validate_amount("planned cost", self.planned_cost)?;

        let mut previous = (self.start_date, 0.0);
        for point in &self.curve {
            validate_percent("planned percent", point.planned_percent)?;
            if point.date < self.start_date || point.date > self.end_date {
                return Err(DomainError::validation(format!(
                    "plan point {} is outside {}..{}",
                    point.date, self.start_date, self.end_date
                )));
            }
            if point.date < previous.0 || point.planned_percent < previous.1 {
                return Err(DomainError::validation(format!(
                    "plan point {} ({}%) goes backward",
                    point.date, point.planned_percent
                )));
            }
            previous = (point.date, point.planned_percent);
        }
        Ok(())
    }

    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    fn anchors(&self) -> Vec<(NaiveDate, f64)> {
        let mut points = Vec::with_capacity(self.curve.len() + 2);
        points.push((self.start_date, 0.0));
        points.extend(self.curve.iter().map(|p| (p.date, p.planned_percent)));
        points.push((self.end_date, 100.0));
        points
    }

    /// Planned completion percentage at a date
    pub fn planned_percent_at(&self, date: NaiveDate) -> f64 {
        if date <= self.start_date {
            return if self.start_date == self.end_date && date == self.end_date {
                100.0
            } else {
                0.0
            };
        }
        if date >= self.end_date {
            return 100.0;
        }
        let anchors = self.anchors();
        for pair in anchors.windows(2) {
            let ((d0, p0), (d1, p1)) = (pair[0], pair[1]);
            if date >= d0 && date <= d1 {
                let span = (d1 - d0).num_days();
                if span == 0 {
                    return p1;
                }
                let elapsed = (date - d0).num_days();
                return p0 + (p1 - p0) * elapsed as f64 / span as f64;
            }
        }
        100.0
    }

    /// Planned value (budgeted cost of work scheduled) at a date
    pub fn planned_value_at(&self, date: NaiveDate) -> f64 {
        self.planned_percent_at(date) / 100.0 * self.planned_cost
    }

    /// First date at which the plan reaches the given completion percentage
    pub fn date_for_percent(&self, percent: f64) -> NaiveDate {
        if percent <= 0.0 {
            return self.start_date;
        }
        let anchors = self.anchors();
        for pair in anchors.windows(2) {
            let ((d0, p0), (d1, p1)) = (pair[0], pair[1]);
            if percent <= p1 && p1 > p0 {
                let fraction = ((percent - p0) / (p1 - p0)).clamp(0.0, 1.0);
                let days = ((d1 - d0).num_days() as f64 * fraction).round() as i64;
                return d0 + Duration::days(days);
            }
        }
        self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub id: BaselineId,
    pub project_id: ProjectId,
    pub tenant_id: TenantId,
    pub baseline_type: BaselineType,
    pub version: u32,
    pub plan: PlanData,
    pub note: Option<String>,
    /// Locked baselines reject updates
    pub locked: bool,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Baseline {
    pub fn new(
        id: impl Into<BaselineId>,
        project: &Project,
        baseline_type: BaselineType,
        version: u32,
        plan: PlanData,
        created_by: impl Into<ActorId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project.id.clone(),
            tenant_id: project.tenant_id.clone(),
            baseline_type,
            version,
            plan,
            note: None,
            locked: false,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_visible_to(&self, tenant_id: &TenantId) -> bool {
        &self.tenant_id == tenant_id
    }

    /// Apply a partial update, returning the new baseline and a per-field diff.
    ///
    /// Fails on locked baselines and on plans that do not validate.
    pub fn apply_update(
        &self,
        update: &BaselineUpdate,
        now: DateTime<Utc>,
    ) -> Result<(Baseline, BTreeMap<String, FieldChange>), DomainError> {
        if self.locked {
            return Err(DomainError::validation(format!(
                "baseline {} (v{}) is locked",
                self.id, self.version
            )));
        }

        let mut next = self.clone();
        let mut changes = BTreeMap::new();

        if let Some(start) = update.start_date {
            diff_field(&mut changes, "startDate", &self.plan.start_date, &start);
            next.plan.start_date = start;
        }
        if let Some(end) = update.end_date {
            diff_field(&mut changes, "endDate", &self.plan.end_date, &end);
            next.plan.end_date = end;
        }
        if let Some(cost) = update.planned_cost {
            diff_field(&mut changes, "plannedCost", &self.plan.planned_cost, &cost);
            next.plan.planned_cost = cost;
        }
        if let Some(curve) = &update.curve {
            diff_field(&mut changes, "curve", &self.plan.curve, curve);
            next.plan.curve = curve.clone();
        }
        if let Some(note) = &update.note {
            diff_field(&mut changes, "note", &self.note, &Some(note.clone()));
            next.note = Some(note.clone());
        }

        next.plan.validate()?;
        if !changes.is_empty() {
            next.updated_at = now;
        }
        Ok((next, changes))
    }
}

/// Partial update of an unlocked baseline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaselineUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub planned_cost: Option<f64>,
    pub curve: Option<Vec<PlanPoint>>,
    pub note: Option<String>,
}

/// Old and new value of one changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

fn diff_field<T: Serialize + PartialEq>(
    changes: &mut BTreeMap<String, FieldChange>,
    name: &str,
    old: &T,
    new: &T,
) {
    if old != new {
        changes.insert(
            name.to_string(),
            FieldChange {
                old: serde_json::to_value(old).unwrap_or(serde_json::Value::Null),
                new: serde_json::to_value(new).unwrap_or(serde_json::Value::Null),
            },
        );
    }
}

/// Next version for a (project, type) given the versions already used
pub fn next_version(existing: impl IntoIterator<Item = u32>) -> u32 {
    existing.into_iter().max().map_or(1, |v| v + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionDirection {
    Upgrade,
    Downgrade,
}

impl VersionDirection {
    pub fn between(from_version: u32, to_version: u32) -> Self {
        if to_version >= from_version {
            VersionDirection::Upgrade
        } else {
            VersionDirection::Downgrade
        }
    }
}

/// Append-only record of one re-baseline transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineHistory {
    pub id: HistoryId,
    pub project_id: ProjectId,
    pub baseline_type: BaselineType,
    /// The baseline that became active
    pub baseline_id: BaselineId,
    pub from_version: u32,
    pub to_version: u32,
    pub note: String,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    /// Variance against the outgoing baseline at the moment of transition
    pub variance_snapshot: Option<VarianceResult>,
}

impl BaselineHistory {
    pub fn direction(&self) -> VersionDirection {
        VersionDirection::between(self.from_version, self.to_version)
    }
}

/// Differences between two baselines of the same project and type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineComparison {
    pub project_id: ProjectId,
    pub baseline_type: BaselineType,
    pub baseline1_id: BaselineId,
    pub baseline2_id: BaselineId,
    pub version1: u32,
    pub version2: u32,
    pub start_shift_days: i64,
    pub end_shift_days: i64,
    pub duration_delta_days: i64,
    pub planned_cost_delta: f64,
    pub planned_cost_delta_percent: Option<f64>,
    pub changed_fields: Vec<String>,
}

/// Compare two baselines; they must share project and type
pub fn compare_baselines(a: &Baseline, b: &Baseline) -> Result<BaselineComparison, DomainError> {
    if a.project_id != b.project_id {
        return Err(DomainError::validation(format!(
            "baselines {} and {} belong to different projects",
            a.id, b.id
        )));
    }
    if a.baseline_type != b.baseline_type {
        return Err(DomainError::validation(format!(
            "cannot compare {} baseline {} with {} baseline {}",
            a.baseline_type, a.id, b.baseline_type, b.id
        )));
    }

    let mut changed_fields = Vec::new();
    if a.plan.start_date != b.plan.start_date {
        changed_fields.push("startDate".to_string());
    }
    if a.plan.end_date != b.plan.end_date {
        changed_fields.push("endDate".to_string());
    }
    if a.plan.planned_cost != b.plan.planned_cost {
        changed_fields.push("plannedCost".to_string());
    }
    if a.plan.curve != b.plan.curve {
        changed_fields.push("curve".to_string());
    }

    let cost_delta = b.plan.planned_cost - a.plan.planned_cost;
    Ok(BaselineComparison {
        project_id: a.project_id.clone(),
        baseline_type: a.baseline_type,
        baseline1_id: a.id.clone(),
        baseline2_id: b.id.clone(),
        version1: a.version,
        version2: b.version,
        start_shift_days: (b.plan.start_date - a.plan.start_date).num_days(),
        end_shift_days: (b.plan.end_date - a.plan.end_date).num_days(),
        duration_delta_days: b.plan.duration_days() - a.plan.duration_days(),
        planned_cost_delta: round_to(cost_delta, 2),
        planned_cost_delta_percent: (a.plan.planned_cost > 0.0)
            .then(|| round_to(cost_delta / a.plan.planned_cost * 100.0, 2)),
        changed_fields,
    })
}

#[cfg(test)]
#[path = "baseline_tests.rs"]
mod tests;
