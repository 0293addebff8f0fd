//! Variance report specs
//!
//! The baseline plans 10000 linearly over Jan 1 - Apr 11 2026 (100 days);
//! every run pins today to Feb 20, halfway through.

use crate::prelude::*;

fn halfway_done(ws: &Workspace, cost: &str) {
    ws.project_with_baseline("p1");
    ws.zm().args(&["task", "progress", "p1", "t1", "100"]).passes();
    ws.zm().args(&["component", "cost", "p1", "c1", cost]).passes();
}

#[test]
fn on_plan_project_is_healthy() {
    let ws = Workspace::new();
    halfway_done(&ws, "5000");

    let v = ws.json(&["variance", "p1", "--type", "contract"]);
    assert_eq!(v["asOf"], TODAY);
    assert_eq!(v["earnedValueData"]["plannedValue"].as_f64(), Some(5000.0));
    assert_eq!(v["earnedValueData"]["earnedValue"].as_f64(), Some(5000.0));
    assert_eq!(v["earnedValueData"]["actualCost"].as_f64(), Some(5000.0));
    assert_eq!(v["scheduleVariance"]["spi"].as_f64(), Some(1.0));
    assert_eq!(v["costVariance"]["cpi"].as_f64(), Some(1.0));
    assert_eq!(v["overallHealth"], "good");
}

#[test]
fn overspend_is_critical() {
    let ws = Workspace::new();
    halfway_done(&ws, "6250");

    let v = ws.json(&["variance", "p1", "--type", "contract"]);
    assert_eq!(v["costVariance"]["cpi"].as_f64(), Some(0.8));
    assert_eq!(v["costVariance"]["amount"].as_f64(), Some(-1250.0));
    assert_eq!(v["overallHealth"], "critical");
    assert!(!v["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn repeated_variance_is_identical() {
    let ws = Workspace::new();
    halfway_done(&ws, "5000");

    let first = ws
        .zm()
        .args(&["variance", "p1", "--type", "contract", "--format", "json"])
        .passes()
        .stdout();
    ws.zm()
        .args(&["variance", "p1", "--type", "contract", "--format", "json"])
        .passes()
        .stdout_eq(&first);
}

#[test]
fn later_date_raises_planned_value() {
    let ws = Workspace::new();
    halfway_done(&ws, "5000");

    let v = ws.json(&["variance", "p1", "--type", "contract", "--today", "2026-03-02"]);
    assert_eq!(v["earnedValueData"]["plannedValue"].as_f64(), Some(6000.0));
    assert_eq!(v["scheduleVariance"]["spi"].as_f64(), Some(0.8333));
    assert_eq!(v["overallHealth"], "critical");
}

#[test]
fn variance_by_baseline_id() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");
    let id = ws.json(&["baseline", "active", "p1", "--type", "contract"])["id"]
        .as_str()
        .unwrap()
        .to_string();

    let v = ws.json(&["variance", "p1", "--baseline", &id]);
    assert_eq!(v["baselineId"], id.as_str());
    assert_eq!(events(&ws, "Project.Variance.Updated").len(), 1);
}

#[test]
fn missing_active_baseline_is_not_found() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");
    ws.zm()
        .args(&["variance", "p1", "--type", "execution"])
        .fails()
        .stderr_has("baseline not found");
}
