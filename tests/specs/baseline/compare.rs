//! Baseline comparison specs

use crate::prelude::*;

#[test]
fn compare_reports_shifts_and_cost_delta() {
    let ws = Workspace::new();
    let v1 = ws.project_with_baseline("p1");
    let v2 = ws.json(&[
        "baseline", "rebaseline", "p1", "--type", "contract", "--start", "2026-01-01", "--end",
        "2026-04-21", "--cost", "12000", "--reason", "scope change",
    ])["baseline"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let cmp = ws.json(&["baseline", "compare", &v1, &v2]);
    assert_eq!(cmp["version1"], 1);
    assert_eq!(cmp["version2"], 2);
    assert_eq!(cmp["startShiftDays"], 0);
    assert_eq!(cmp["endShiftDays"], 10);
    assert_eq!(cmp["durationDeltaDays"], 10);
    assert_eq!(cmp["plannedCostDelta"].as_f64(), Some(2000.0));
    assert_eq!(cmp["plannedCostDeltaPercent"].as_f64(), Some(20.0));
    assert_eq!(cmp["changedFields"], serde_json::json!(["endDate", "plannedCost"]));

    assert_eq!(events(&ws, "Project.Baseline.Compared").len(), 1);
}

#[test]
fn compare_across_types_is_rejected() {
    let ws = Workspace::new();
    let contract = ws.project_with_baseline("p1");
    let execution = ws.json(&[
        "baseline", "create", "p1", "--type", "execution", "--start", "2026-01-01", "--end",
        "2026-04-11", "--cost", "10000",
    ])["id"]
        .as_str()
        .unwrap()
        .to_string();

    ws.zm()
        .args(&["baseline", "compare", &contract, &execution])
        .fails()
        .stderr_has("cannot compare contract baseline");
}

#[test]
fn text_comparison_is_readable() {
    let ws = Workspace::new();
    let v1 = ws.project_with_baseline("p1");

    ws.zm()
        .args(&["baseline", "compare", &v1, &v1])
        .passes()
        .stdout_eq(
            "contract v1 vs v1\n  Start shift: 0 days\n  End shift: 0 days\n  Duration delta: 0 days\n  Cost delta: 0.00 (0.00%)\n  Changed: \n",
        );
}
