// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::baseline::PlanData;
use chrono::Utc;
use yare::parameterized;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 100-day plan, 10_000 budget, linear curve
fn baseline() -> Baseline {
    let plan = PlanData::new(date(2026, 1, 1), date(2026, 4, 11), 10_000.0);
    Baseline::new(
        "b-1",
        &Project::new("p-1", "tenant-a", "Tower", "pm", Utc::now()),
        BaselineType::Contract,
        1,
        plan,
        "pm",
        Utc::now(),
    )
}

fn project_at(progress: f64, cost: f64) -> Project {
    let mut project = Project::new("p-1", "tenant-a", "Tower", "pm", Utc::now());
    project.apply_rollup(progress, cost, Utc::now());
    project
}

fn variance(progress: f64, cost: f64, as_of: NaiveDate) -> VarianceResult {
    compute_variance(
        &project_at(progress, cost),
        true,
        &baseline(),
        as_of,
        &HealthPolicy::default(),
    )
    .unwrap()
}

#[test]
fn on_plan_project_is_good() {
    let result = variance(50.0, 5_000.0, date(2026, 2, 20));

    let ev = &result.earned_value_data;
    assert_eq!(ev.planned_value, 5_000.0);
    assert_eq!(ev.earned_value, 5_000.0);
    assert_eq!(ev.actual_cost, 5_000.0);
    assert_eq!(ev.spi, Some(1.0));
    assert_eq!(ev.cpi, Some(1.0));
    assert_eq!(ev.estimate_at_completion, 10_000.0);
    assert_eq!(ev.estimate_to_complete, 5_000.0);
    assert_eq!(ev.variance_at_completion, 0.0);
    assert_eq!(result.schedule_variance.days, 0);
    assert_eq!(result.overall_health, Health::Good);
    assert_eq!(result.recommendations, vec!["On track against the baseline"]);
}

#[test]
fn behind_and_over_budget_is_critical() {
    let result = variance(40.0, 5_000.0, date(2026, 2, 20));

    assert_eq!(result.schedule_variance.amount, -1_000.0);
    assert_eq!(result.schedule_variance.spi, Some(0.8));
    // 40% was planned for Feb 10, ten days ago
    assert_eq!(result.schedule_variance.days, -10);
    assert_eq!(result.cost_variance.amount, -1_000.0);
    assert_eq!(result.cost_variance.percent, Some(-25.0));
    assert_eq!(result.cost_variance.cpi, Some(0.8));
    assert_eq!(result.earned_value_data.estimate_at_completion, 12_500.0);
    assert_eq!(result.earned_value_data.estimate_to_complete, 7_500.0);
    assert_eq!(result.earned_value_data.variance_at_completion, -2_500.0);
    assert_eq!(result.overall_health, Health::Critical);
    assert_eq!(result.recommendations.len(), 3);
    assert!(result.recommendations[0].contains("behind schedule"));
    assert!(result.recommendations[2].contains("re-baselining"));
}

#[test]
fn overall_health_is_the_worse_index() {
    // SPI 0.9 (warning), CPI 1.0 (good)
    let result = variance(45.0, 4_500.0, date(2026, 2, 20));
    assert_eq!(result.schedule_variance.spi, Some(0.9));
    assert_eq!(result.cost_variance.cpi, Some(1.0));
    assert_eq!(result.overall_health, Health::Warning);
}

#[test]
fn no_data_yields_zero_variance_and_good_health() {
    let result = compute_variance(
        &project_at(0.0, 0.0),
        false,
        &baseline(),
        date(2026, 3, 1),
        &HealthPolicy::default(),
    )
    .unwrap();

    assert_eq!(result.schedule_variance.amount, 0.0);
    assert_eq!(result.schedule_variance.spi, None);
    assert_eq!(result.cost_variance.amount, 0.0);
    assert_eq!(result.earned_value_data.budget_at_completion, 10_000.0);
    assert_eq!(result.overall_health, Health::Good);
}

#[test]
fn baseline_of_another_project_is_rejected() {
    let mut other = baseline();
    other.project_id = ProjectId::new("p-2");
    let err = compute_variance(
        &project_at(10.0, 10.0),
        true,
        &other,
        date(2026, 2, 1),
        &HealthPolicy::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[test]
fn completed_project_has_no_schedule_slip() {
    let result = variance(100.0, 10_000.0, date(2026, 5, 1));
    assert_eq!(result.schedule_variance.days, 0);
    assert_eq!(result.schedule_variance.spi, Some(1.0));
}

#[test]
fn work_before_plan_start_is_ahead() {
    let result = variance(10.0, 500.0, date(2025, 12, 20));
    assert_eq!(result.earned_value_data.planned_value, 0.0);
    assert_eq!(result.schedule_variance.spi, None);
    assert_eq!(result.schedule_variance.days, 10);
    assert_eq!(result.cost_variance.cpi, Some(2.0));
    assert_eq!(result.overall_health, Health::Good);
}

#[test]
fn spend_without_progress_forecasts_full_budget_on_top() {
    let result = variance(0.0, 1_000.0, date(2026, 2, 20));
    assert_eq!(result.cost_variance.cpi, Some(0.0));
    assert_eq!(result.earned_value_data.estimate_at_completion, 11_000.0);
    assert_eq!(result.overall_health, Health::Critical);
}

#[test]
fn results_serialize_identically_and_in_camel_case() {
    let a = serde_json::to_string(&variance(40.0, 5_000.0, date(2026, 2, 20))).unwrap();
    let b = serde_json::to_string(&variance(40.0, 5_000.0, date(2026, 2, 20))).unwrap();
    assert_eq!(a, b);

    let json: serde_json::Value = serde_json::from_str(&a).unwrap();
    assert_eq!(json["earnedValueData"]["budgetAtCompletion"], 10_000.0);
    assert_eq!(json["overallHealth"], "critical");
    assert_eq!(json["baselineType"], "contract");
}

#[parameterized(
    at_good = { 0.95, Health::Good },
    above_one = { 1.2, Health::Good },
    just_below_good = { 0.9499, Health::Warning },
    at_warning = { 0.85, Health::Warning },
    just_below_warning = { 0.8499, Health::Critical },
    zero = { 0.0, Health::Critical },
)]
fn health_classification(index: f64, expected: Health) {
    assert_eq!(HealthPolicy::default().classify(index), expected);
}

#[test]
fn health_policy_rejects_inverted_thresholds() {
    assert!(HealthPolicy::default().validate().is_ok());
    let inverted = HealthPolicy {
        good_threshold: 0.8,
        warning_threshold: 0.9,
    };
    assert!(matches!(inverted.validate(), Err(DomainError::Validation(_))));
}
