//! Rollup specs
//!
//! Task changes recompute component and project progress in the same
//! command, and only significant changes publish `RollupUpdated`.

use crate::prelude::*;

const ROLLUP_EVENTS: &str = "Project.Project.RollupUpdated";

#[test]
fn completing_tasks_rolls_up_to_component_and_project() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1"), ("t2", "1")]);

    let first = ws.json(&["task", "progress", "p1", "t1", "100"]);
    assert_eq!(first["task"]["status"], "completed");
    assert_eq!(first["rollup"]["rollup"]["old_progress"].as_f64(), Some(0.0));
    assert_eq!(first["rollup"]["rollup"]["new_progress"].as_f64(), Some(50.0));
    assert_eq!(first["rollup"]["significant"], true);

    let second = ws.json(&["task", "progress", "p1", "t2", "100"]);
    assert_eq!(second["rollup"]["rollup"]["old_progress"].as_f64(), Some(50.0));
    assert_eq!(second["rollup"]["rollup"]["new_progress"].as_f64(), Some(100.0));

    let view = ws.json(&["project", "show", "p1"]);
    assert_eq!(view["project"]["progress_percent"].as_f64(), Some(100.0));
    assert_eq!(view["components"][0]["progress_percent"].as_f64(), Some(100.0));

    let events = events(&ws, ROLLUP_EVENTS);
    let pairs: Vec<_> = events
        .iter()
        .map(|e| (e["oldProgress"].as_f64(), e["newProgress"].as_f64()))
        .collect();
    assert_eq!(
        pairs,
        vec![(Some(0.0), Some(50.0)), (Some(50.0), Some(100.0))]
    );
    assert_eq!(events[0]["triggerKind"], "task");
    assert_eq!(events[0]["triggerId"], "t1");
}

#[test]
fn half_percent_change_is_stored_but_not_published() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1"), ("t2", "1")]);

    let small = ws.json(&["task", "progress", "p1", "t1", "1"]);
    assert_eq!(small["rollup"]["rollup"]["new_progress"].as_f64(), Some(0.5));
    assert_eq!(small["rollup"]["significant"], false);
    assert!(events(&ws, ROLLUP_EVENTS).is_empty());

    let full = ws.json(&["task", "progress", "p1", "t1", "3"]);
    assert_eq!(full["rollup"]["rollup"]["old_progress"].as_f64(), Some(0.5));
    assert_eq!(full["rollup"]["rollup"]["new_progress"].as_f64(), Some(1.5));
    assert_eq!(full["rollup"]["significant"], true);
    assert_eq!(events(&ws, ROLLUP_EVENTS).len(), 1);
}

#[test]
fn estimated_hours_weight_the_rollup() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("short", "2"), ("long", "6")]);

    let change = ws.json(&["task", "progress", "p1", "long", "50"]);
    assert_eq!(change["rollup"]["rollup"]["new_progress"].as_f64(), Some(37.5));
}

#[test]
fn cancelled_task_leaves_the_rollup() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1"), ("t2", "1")]);
    ws.zm().args(&["task", "progress", "p1", "t1", "100"]).passes();

    let cancel = ws.json(&["task", "cancel", "p1", "t2"]);
    assert_eq!(cancel["task"]["status"], "cancelled");
    assert_eq!(cancel["rollup"]["rollup"]["new_progress"].as_f64(), Some(100.0));
}

#[test]
fn manual_rollup_without_changes_is_quiet() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1")]);

    let outcome = ws.json(&["rollup", "p1"]);
    assert_eq!(outcome["significant"], false);
    assert_eq!(outcome["rollup"]["trigger"]["kind"], "manual");
    ws.zm()
        .args(&["rollup", "p1"])
        .passes()
        .stdout_has("below threshold, no event");
}

#[test]
fn component_cost_rolls_up_to_the_project() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[]);
    ws.zm()
        .args(&["component", "add", "p1", "--id", "c2", "--name", "Framing"])
        .args(&["--parent", "c1", "--cost", "250"])
        .passes();

    let change = ws.json(&["component", "cost", "p1", "c1", "100"]);
    assert_eq!(change["rollup"]["rollup"]["new_cost"].as_f64(), Some(350.0));

    let view = ws.json(&["project", "show", "p1"]);
    assert_eq!(view["project"]["cost"].as_f64(), Some(350.0));
}

#[test]
fn moving_a_component_under_its_descendant_is_rejected() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[]);
    ws.zm()
        .args(&["component", "add", "p1", "--id", "c2", "--name", "Child", "--parent", "c1"])
        .passes();

    ws.zm()
        .args(&["component", "move", "p1", "c1", "--parent", "c2"])
        .fails()
        .stderr_has("validation failed");
}
