// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

fn project() -> Project {
    Project::new("p-1", "tenant-a", "Tower", "pm", Utc::now())
}

fn plan() -> PlanData {
    // 100 days, 10_000 budget
    PlanData::new(date(1, 1), date(4, 11), 10_000.0)
}

fn baseline(id: &str, version: u32, plan: PlanData) -> Baseline {
    Baseline::new(id, &project(), BaselineType::Contract, version, plan, "pm", Utc::now())
}

#[test]
fn baseline_type_parses_known_values_only() {
    assert_eq!("contract".parse::<BaselineType>().unwrap(), BaselineType::Contract);
    assert_eq!("execution".parse::<BaselineType>().unwrap(), BaselineType::Execution);
    let err = "forecast".parse::<BaselineType>().unwrap_err();
    assert!(matches!(err, DomainError::Validation(msg) if msg.contains("forecast")));
}

#[test]
fn next_version_starts_at_one_and_skips_past_max() {
    assert_eq!(next_version(Vec::<u32>::new()), 1);
    assert_eq!(next_version(vec![1, 2, 3]), 4);
    assert_eq!(next_version(vec![3, 1]), 4);
}

#[test]
fn linear_plan_interpolates_between_anchors() {
    let plan = plan();
    assert_eq!(plan.duration_days(), 100);
    assert_eq!(plan.planned_percent_at(date(1, 1)), 0.0);
    assert_eq!(plan.planned_percent_at(date(2, 20)), 50.0);
    assert_eq!(plan.planned_percent_at(date(4, 11)), 100.0);
    assert_eq!(plan.planned_percent_at(date(6, 1)), 100.0);
    assert_eq!(plan.planned_percent_at(date(1, 1) - Duration::days(5)), 0.0);
    assert_eq!(plan.planned_value_at(date(2, 20)), 5_000.0);
}

#[test]
fn curve_points_shape_the_plan() {
    // front-loaded: 80% by day 50
    let plan = plan().with_point(date(2, 20), 80.0);
    assert_eq!(plan.planned_percent_at(date(1, 26)), 40.0);
    assert_eq!(plan.planned_percent_at(date(2, 20)), 80.0);
    assert_eq!(plan.planned_percent_at(date(3, 17)), 90.0);
}

#[test]
fn date_for_percent_inverts_the_curve() {
    let plan = plan().with_point(date(2, 20), 80.0);
    assert_eq!(plan.date_for_percent(0.0), date(1, 1));
    assert_eq!(plan.date_for_percent(40.0), date(1, 26));
    assert_eq!(plan.date_for_percent(90.0), date(3, 17));
    assert_eq!(plan.date_for_percent(100.0), date(4, 11));
}

#[test]
fn plan_validation_rejects_backward_points_and_bad_window() {
    assert!(plan().validate().is_ok());

    let reversed = PlanData::new(date(4, 1), date(1, 1), 10.0);
    assert!(matches!(reversed.validate(), Err(DomainError::Validation(_))));

    let backward = plan().with_point(date(2, 1), 50.0).with_point(date(3, 1), 40.0);
    assert!(matches!(backward.validate(), Err(DomainError::Validation(_))));

    let outside = plan().with_point(date(5, 1), 50.0);
    assert!(matches!(outside.validate(), Err(DomainError::Validation(_))));

    let negative = PlanData::new(date(1, 1), date(2, 1), -1.0);
    assert!(matches!(negative.validate(), Err(DomainError::Validation(_))));
}

#[test]
fn update_reports_old_and_new_values_per_field() {
    let original = baseline("b-1", 1, plan());
    let update = BaselineUpdate {
        end_date: Some(date(5, 1)),
        planned_cost: Some(12_000.0),
        ..BaselineUpdate::default()
    };

    let (updated, changes) = original.apply_update(&update, Utc::now()).unwrap();

    assert_eq!(updated.plan.end_date, date(5, 1));
    assert_eq!(updated.plan.planned_cost, 12_000.0);
    assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["endDate", "plannedCost"]);
    assert_eq!(changes["endDate"].old, serde_json::json!("2026-04-11"));
    assert_eq!(changes["endDate"].new, serde_json::json!("2026-05-01"));
    assert_eq!(changes["plannedCost"].old, serde_json::json!(10_000.0));
}

#[test]
fn update_with_same_values_reports_no_changes() {
    let original = baseline("b-1", 1, plan());
    let update = BaselineUpdate {
        planned_cost: Some(10_000.0),
        ..BaselineUpdate::default()
    };
    let (updated, changes) = original.apply_update(&update, Utc::now()).unwrap();
    assert!(changes.is_empty());
    assert_eq!(updated, original);
}

#[test]
fn locked_baseline_rejects_updates() {
    let mut locked = baseline("b-1", 1, plan());
    locked.locked = true;
    let err = locked
        .apply_update(&BaselineUpdate::default(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(msg) if msg.contains("locked")));
}

#[test]
fn update_producing_invalid_plan_is_rejected() {
    let original = baseline("b-1", 1, plan());
    let update = BaselineUpdate {
        end_date: Some(date(1, 1) - Duration::days(1)),
        ..BaselineUpdate::default()
    };
    assert!(original.apply_update(&update, Utc::now()).is_err());
}

#[test]
fn comparison_reports_schedule_and_cost_shift() {
    let v1 = baseline("b-1", 1, plan());
    let v2 = baseline(
        "b-2",
        2,
        PlanData::new(date(1, 11), date(5, 1), 12_500.0),
    );

    let cmp = compare_baselines(&v1, &v2).unwrap();
    assert_eq!(cmp.version1, 1);
    assert_eq!(cmp.version2, 2);
    assert_eq!(cmp.start_shift_days, 10);
    assert_eq!(cmp.end_shift_days, 20);
    assert_eq!(cmp.duration_delta_days, 10);
    assert_eq!(cmp.planned_cost_delta, 2_500.0);
    assert_eq!(cmp.planned_cost_delta_percent, Some(25.0));
    assert_eq!(cmp.changed_fields, vec!["startDate", "endDate", "plannedCost"]);
}

#[test]
fn comparison_across_types_or_projects_is_rejected() {
    let contract = baseline("b-1", 1, plan());
    let mut execution = baseline("b-2", 1, plan());
    execution.baseline_type = BaselineType::Execution;
    assert!(matches!(
        compare_baselines(&contract, &execution),
        Err(DomainError::Validation(_))
    ));

    let mut other = baseline("b-3", 2, plan());
    other.project_id = ProjectId::new("p-2");
    assert!(matches!(
        compare_baselines(&contract, &other),
        Err(DomainError::Validation(_))
    ));
}

#[test]
fn history_direction_follows_version_delta() {
    assert_eq!(VersionDirection::between(1, 2), VersionDirection::Upgrade);
    assert_eq!(VersionDirection::between(3, 1), VersionDirection::Downgrade);
}
