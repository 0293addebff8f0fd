// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bottom-up progress and cost aggregation
//!
//! [`compute_rollup`] is a pure function of a project and its tree. It
//! walks components in post-order so each parent sees its children's
//! rolled values:
//!
//! - progress: weighted average of direct tasks and child components
//! - cost: the component's own cost plus its children's rolled cost
//!
//! Weighting follows [`Weighting`]. A component with no children and no
//! eligible task rolls up to its manual progress.

use crate::error::DomainError;
use crate::hierarchy::ProjectTree;
use crate::id::{ComponentId, ProjectId, TaskId};
use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for float noise in threshold comparisons
const EPSILON: f64 = 1e-9;

/// Smallest cost movement that counts when the previous cost was zero
const MIN_COST_DELTA: f64 = 0.01;

/// How sibling contributions are weighted when averaging progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Weight by estimated hours; a sibling group with any unknown
    /// estimate falls back to equal weights.
    #[default]
    EstimatedHours,
    /// Every direct contributor weighs the same
    Equal,
}

/// How a cost movement is judged significant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostThresholdMode {
    /// Threshold is a percentage of the previous cost
    #[default]
    Relative,
    /// Threshold is a flat currency amount
    Absolute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupPolicy {
    pub weighting: Weighting,
    /// Minimum progress movement, in percentage points
    pub progress_threshold: f64,
    pub cost_threshold_mode: CostThresholdMode,
    /// Percent of previous cost (relative) or currency units (absolute)
    pub cost_threshold: f64,
}

impl Default for RollupPolicy {
    fn default() -> Self {
        Self {
            weighting: Weighting::default(),
            progress_threshold: 1.0,
            cost_threshold_mode: CostThresholdMode::default(),
            cost_threshold: 1.0,
        }
    }
}

impl RollupPolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.progress_threshold.is_finite() && self.progress_threshold > 0.0) {
            return Err(DomainError::validation(
                "rollup.progress_threshold must be positive",
            ));
        }
        if !(self.cost_threshold.is_finite() && self.cost_threshold > 0.0) {
            return Err(DomainError::validation(
                "rollup.cost_threshold must be positive",
            ));
        }
        Ok(())
    }

    pub fn is_significant_progress(&self, old: f64, new: f64) -> bool {
        (new - old).abs() + EPSILON >= self.progress_threshold
    }

    pub fn is_significant_cost(&self, old: f64, new: f64) -> bool {
        let delta = (new - old).abs();
        match self.cost_threshold_mode {
            CostThresholdMode::Absolute => delta + EPSILON >= self.cost_threshold,
            CostThresholdMode::Relative if old.abs() < EPSILON => {
                delta + EPSILON >= MIN_COST_DELTA
            }
            CostThresholdMode::Relative => {
                delta / old.abs() * 100.0 + EPSILON >= self.cost_threshold
            }
        }
    }
}

/// What initiated a recomputation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RollupTrigger {
    Task(TaskId),
    Component(ComponentId),
    Manual,
}

impl RollupTrigger {
    pub fn kind(&self) -> &'static str {
        match self {
            RollupTrigger::Task(_) => "task",
            RollupTrigger::Component(_) => "component",
            RollupTrigger::Manual => "manual",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            RollupTrigger::Task(id) => Some(id.as_str()),
            RollupTrigger::Component(id) => Some(id.as_str()),
            RollupTrigger::Manual => None,
        }
    }
}

/// Rolled values for one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRollup {
    pub progress_percent: f64,
    pub cost: f64,
    /// Total estimated hours of the subtree, when every contributor has one
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupResult {
    pub project_id: ProjectId,
    pub trigger: RollupTrigger,
    pub old_progress: f64,
    pub new_progress: f64,
    pub old_cost: f64,
    pub new_cost: f64,
    pub components: BTreeMap<ComponentId, ComponentRollup>,
    /// Components whose stored progress or cost differs from the rolled value
    pub affected_components: Vec<ComponentId>,
}

impl RollupResult {
    pub fn has_significant_change(&self, policy: &RollupPolicy) -> bool {
        policy.is_significant_progress(self.old_progress, self.new_progress)
            || policy.is_significant_cost(self.old_cost, self.new_cost)
    }

    /// Whether anything would change when the result is persisted
    pub fn changes_anything(&self) -> bool {
        !self.affected_components.is_empty()
            || (self.new_progress - self.old_progress).abs() > EPSILON
            || (self.new_cost - self.old_cost).abs() > EPSILON
    }
}

struct Contribution {
    progress: f64,
    hours: Option<f64>,
}

/// Recompute a project's progress and cost from its tree
pub fn compute_rollup(
    project: &Project,
    tree: &ProjectTree,
    trigger: RollupTrigger,
    policy: &RollupPolicy,
) -> Result<RollupResult, DomainError> {
    if tree.project_id() != &project.id {
        return Err(DomainError::Consistency(format!(
            "tree of project {} used to roll up project {}",
            tree.project_id(),
            project.id
        )));
    }

    let mut rolled: BTreeMap<ComponentId, ComponentRollup> = BTreeMap::new();

    for id in tree.post_order() {
        let component = tree
            .component(&id)
            .ok_or_else(|| DomainError::Consistency(format!("component {} vanished", id)))?;

        let mut contributions = task_contributions(tree, Some(&id));
        let mut children_cost = 0.0;
        for child in tree.children(&id) {
            let child_rollup = rolled.get(&child.id).ok_or_else(|| {
                DomainError::Consistency(format!(
                    "component {} rolled up before its child {}",
                    id, child.id
                ))
            })?;
            children_cost += child_rollup.cost;
            contributions.push(Contribution {
                progress: child_rollup.progress_percent,
                hours: child_rollup.hours,
            });
        }

        let (progress, hours) = if contributions.is_empty() {
            (component.manual_progress, None)
        } else {
            (
                weighted_average(&contributions, policy.weighting),
                total_hours(&contributions),
            )
        };
        let cost = component.own_cost + children_cost;
        check_values(&format!("component {}", id), progress, cost)?;

        rolled.insert(
            id,
            ComponentRollup {
                progress_percent: round_to(progress, 4),
                cost: round_to(cost, 2),
                hours,
            },
        );
    }

    let mut contributions = task_contributions(tree, None);
    let mut project_cost = 0.0;
    for root in tree.roots() {
        if let Some(r) = rolled.get(&root.id) {
            project_cost += r.cost;
            contributions.push(Contribution {
                progress: r.progress_percent,
                hours: r.hours,
            });
        }
    }
    let project_progress = if contributions.is_empty() {
        0.0
    } else {
        weighted_average(&contributions, policy.weighting)
    };
    check_values(&format!("project {}", project.id), project_progress, project_cost)?;

    let affected_components = rolled
        .iter()
        .filter(|(id, r)| {
            tree.component(id).is_some_and(|c| {
                (c.progress_percent - r.progress_percent).abs() > EPSILON
                    || (c.cost - r.cost).abs() > EPSILON
            })
        })
        .map(|(id, _)| id.clone())
        .collect();

    Ok(RollupResult {
        project_id: project.id.clone(),
        trigger,
        old_progress: project.progress_percent(),
        new_progress: round_to(project_progress, 4),
        old_cost: project.cost(),
        new_cost: round_to(project_cost, 2),
        components: rolled,
        affected_components,
    })
}

fn task_contributions(tree: &ProjectTree, component: Option<&ComponentId>) -> Vec<Contribution> {
    tree.tasks_of(component)
        .filter(|t| t.counts_toward_rollup())
        .map(|t| Contribution {
            progress: t.progress_percent,
            hours: t.hours_weight(),
        })
        .collect()
}

fn weighted_average(contributions: &[Contribution], weighting: Weighting) -> f64 {
    let hours: Option<Vec<f64>> = match weighting {
        Weighting::EstimatedHours => contributions.iter().map(|c| c.hours).collect(),
        Weighting::Equal => None,
    };

    match hours {
        Some(weights) => {
            let total: f64 = weights.iter().sum();
            contributions
                .iter()
                .zip(&weights)
                .map(|(c, w)| c.progress * w)
                .sum::<f64>()
                / total
        }
        None => {
            contributions.iter().map(|c| c.progress).sum::<f64>() / contributions.len() as f64
        }
    }
}

fn total_hours(contributions: &[Contribution]) -> Option<f64> {
    contributions.iter().map(|c| c.hours).sum()
}

fn check_values(what: &str, progress: f64, cost: f64) -> Result<(), DomainError> {
    if !progress.is_finite() || !(0.0..=100.0 + EPSILON).contains(&progress) {
        return Err(DomainError::Consistency(format!(
            "{} rolled up to impossible progress {}",
            what, progress
        )));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(DomainError::Consistency(format!(
            "{} rolled up to impossible cost {}",
            what, cost
        )));
    }
    Ok(())
}

/// Round half away from zero to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
#[path = "rollup_tests.rs"]
mod tests;
