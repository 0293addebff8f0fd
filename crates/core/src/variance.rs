// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Earned-value variance against a baseline
//!
//! [`compute_variance`] is a pure function of the project's rolled-up
//! state, a baseline, and an as-of date. Money is rounded to cents and
//! indices to four places so repeated calls serialize identically.

use crate::baseline::{Baseline, BaselineType};
use crate::error::DomainError;
use crate::id::{BaselineId, ProjectId};
use crate::project::Project;
use crate::rollup::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Overall health, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Good,
    Warning,
    Critical,
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Health::Good => "good",
            Health::Warning => "warning",
            Health::Critical => "critical",
        })
    }
}

/// SPI/CPI cutoffs for health classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPolicy {
    /// Indices at or above this are good
    pub good_threshold: f64,
    /// Indices at or above this (and below good) are a warning
    pub warning_threshold: f64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            good_threshold: 0.95,
            warning_threshold: 0.85,
        }
    }
}

impl HealthPolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        let ordered = self.warning_threshold.is_finite()
            && self.good_threshold.is_finite()
            && self.warning_threshold > 0.0
            && self.warning_threshold <= self.good_threshold;
        if !ordered {
            return Err(DomainError::validation(
                "health thresholds must satisfy 0 < warning_threshold <= good_threshold",
            ));
        }
        Ok(())
    }

    pub fn classify(&self, index: f64) -> Health {
        if index >= self.good_threshold {
            Health::Good
        } else if index >= self.warning_threshold {
            Health::Warning
        } else {
            Health::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleVariance {
    /// EV - PV
    pub amount: f64,
    /// Earned-schedule date minus as-of date; negative means behind
    pub days: i64,
    /// Schedule performance index, EV / PV
    pub spi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostVariance {
    /// EV - AC
    pub amount: f64,
    /// (EV - AC) / EV as a percentage
    pub percent: Option<f64>,
    /// Cost performance index, EV / AC
    pub cpi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedValueData {
    pub budget_at_completion: f64,
    pub planned_percent: f64,
    pub earned_percent: f64,
    pub planned_value: f64,
    pub earned_value: f64,
    pub actual_cost: f64,
    pub spi: Option<f64>,
    pub cpi: Option<f64>,
    pub estimate_at_completion: f64,
    pub estimate_to_complete: f64,
    pub variance_at_completion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceResult {
    pub project_id: ProjectId,
    pub baseline_id: BaselineId,
    pub baseline_type: BaselineType,
    pub baseline_version: u32,
    pub as_of: NaiveDate,
    pub schedule_variance: ScheduleVariance,
    pub cost_variance: CostVariance,
    pub earned_value_data: EarnedValueData,
    pub overall_health: Health,
    pub recommendations: Vec<String>,
}

/// Compute variance of a project against one of its baselines.
///
/// `has_data` is false when the project has no tasks or components yet;
/// the result is then a zero-variance report rather than an error.
pub fn compute_variance(
    project: &Project,
    has_data: bool,
    baseline: &Baseline,
    as_of: NaiveDate,
    policy: &HealthPolicy,
) -> Result<VarianceResult, DomainError> {
    if baseline.project_id != project.id {
        return Err(DomainError::validation(format!(
            "baseline {} belongs to project {}, not {}",
            baseline.id, baseline.project_id, project.id
        )));
    }

    let plan = &baseline.plan;
    let bac = plan.planned_cost;

    if !has_data {
        return Ok(VarianceResult {
            project_id: project.id.clone(),
            baseline_id: baseline.id.clone(),
            baseline_type: baseline.baseline_type,
            baseline_version: baseline.version,
            as_of,
            schedule_variance: ScheduleVariance {
                amount: 0.0,
                days: 0,
                spi: None,
            },
            cost_variance: CostVariance {
                amount: 0.0,
                percent: None,
                cpi: None,
            },
            earned_value_data: EarnedValueData {
                budget_at_completion: round_to(bac, 2),
                planned_percent: 0.0,
                earned_percent: 0.0,
                planned_value: 0.0,
                earned_value: 0.0,
                actual_cost: 0.0,
                spi: None,
                cpi: None,
                estimate_at_completion: round_to(bac, 2),
                estimate_to_complete: round_to(bac, 2),
                variance_at_completion: 0.0,
            },
            overall_health: Health::Good,
            recommendations: vec![
                "No progress has been recorded yet; variance will be tracked after the first update"
                    .to_string(),
            ],
        });
    }

    let planned_percent = plan.planned_percent_at(as_of);
    let earned_percent = project.progress_percent();
    let pv = round_to(planned_percent / 100.0 * bac, 2);
    let ev = round_to(earned_percent / 100.0 * bac, 2);
    let ac = round_to(project.cost(), 2);

    let spi = (pv > 0.0).then(|| round_to(ev / pv, 4));
    let cpi = (ac > 0.0).then(|| round_to(ev / ac, 4));

    let eac = match cpi {
        Some(cpi) if cpi > 0.0 => round_to(bac / cpi, 2),
        // Nothing earned against real spend: the overrun is unbounded,
        // so forecast what is already spent plus the full budget.
        Some(_) => round_to(ac + bac, 2),
        None => round_to(bac, 2),
    };
    let etc = round_to((eac - ac).max(0.0), 2);
    let vac = round_to(bac - eac, 2);

    let schedule_days = if earned_percent >= 100.0 {
        0
    } else {
        let earned_date = plan.date_for_percent(earned_percent);
        let reference = as_of.max(plan.start_date);
        (earned_date - reference).num_days()
    };

    let overall_health = [spi, cpi]
        .into_iter()
        .flatten()
        .map(|index| policy.classify(index))
        .max()
        .unwrap_or(Health::Good);

    let schedule_variance = ScheduleVariance {
        amount: round_to(ev - pv, 2),
        days: schedule_days,
        spi,
    };
    let cost_variance = CostVariance {
        amount: round_to(ev - ac, 2),
        percent: (ev > 0.0).then(|| round_to((ev - ac) / ev * 100.0, 2)),
        cpi,
    };
    let earned_value_data = EarnedValueData {
        budget_at_completion: round_to(bac, 2),
        planned_percent: round_to(planned_percent, 4),
        earned_percent: round_to(earned_percent, 4),
        planned_value: pv,
        earned_value: ev,
        actual_cost: ac,
        spi,
        cpi,
        estimate_at_completion: eac,
        estimate_to_complete: etc,
        variance_at_completion: vac,
    };
    let recommendations = recommend(&schedule_variance, &cost_variance, vac, policy);

    Ok(VarianceResult {
        project_id: project.id.clone(),
        baseline_id: baseline.id.clone(),
        baseline_type: baseline.baseline_type,
        baseline_version: baseline.version,
        as_of,
        schedule_variance,
        cost_variance,
        earned_value_data,
        overall_health,
        recommendations,
    })
}

fn recommend(
    schedule: &ScheduleVariance,
    cost: &CostVariance,
    vac: f64,
    policy: &HealthPolicy,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(spi) = schedule.spi {
        match policy.classify(spi) {
            Health::Good => {}
            Health::Warning => out.push(format!(
                "Behind schedule (SPI {:.2}, {} days); consider resource reallocation",
                spi, schedule.days
            )),
            Health::Critical => out.push(format!(
                "Critically behind schedule (SPI {:.2}, {} days); escalate and review the critical path",
                spi, schedule.days
            )),
        }
    }

    if let Some(cpi) = cost.cpi {
        match policy.classify(cpi) {
            Health::Good => {}
            Health::Warning => out.push(format!(
                "Over budget (CPI {:.2}); review cost drivers on the most expensive components",
                cpi
            )),
            Health::Critical => out.push(format!(
                "Critically over budget (CPI {:.2}); freeze discretionary spend and re-estimate remaining work",
                cpi
            )),
        }
    }

    if vac < 0.0 {
        out.push(format!(
            "Forecast exceeds the baseline budget by {:.2}; consider re-baselining",
            -vac
        ));
    }

    if out.is_empty() {
        out.push("On track against the baseline".to_string());
    }
    out
}

#[cfg(test)]
#[path = "variance_tests.rs"]
mod tests;
