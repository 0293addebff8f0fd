//! Error reporting specs
//!
//! Failures exit non-zero with an `error:` line on stderr and leave the
//! store untouched.

use crate::prelude::*;

#[test]
fn missing_project_suggests_listing() {
    let ws = Workspace::new();
    ws.zm()
        .args(&["project", "show", "nope"])
        .fails()
        .stderr_has("error: project not found: nope")
        .stderr_has("zm project list");
}

#[test]
fn out_of_range_progress_is_rejected_without_change() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "4")]);

    ws.zm()
        .args(&["task", "progress", "p1", "t1", "150"])
        .fails()
        .stderr_has("validation failed");

    let view = ws.json(&["project", "show", "p1"]);
    assert_eq!(view["tasks"][0]["progress_percent"].as_f64(), Some(0.0));
    assert_eq!(view["tasks"][0]["status"], "pending");
}

#[test]
fn malformed_plan_point_is_a_usage_error() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[]);
    ws.zm()
        .args(&["baseline", "create", "p1", "--start", "2026-01-01", "--end", "2026-04-11"])
        .args(&["--cost", "100", "--point", "2026-02-01"])
        .fails()
        .stderr_has("expected DATE=PERCENT");
}

#[test]
fn unknown_baseline_type_is_a_usage_error() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[]);
    ws.zm()
        .args(&["baseline", "active", "p1", "--type", "forecast"])
        .fails()
        .stderr_has("invalid baseline type");
}

#[test]
fn invalid_config_is_reported() {
    let ws = Workspace::new();
    ws.file(
        "zm.toml",
        "[health]\ngood_threshold = 0.5\nwarning_threshold = 0.9\n",
    );
    ws.zm()
        .args(&["project", "list"])
        .fails()
        .stderr_has("error:");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let ws = Workspace::new();
    let missing = ws.path().join("typo.toml");
    ws.zm()
        .args(&["project", "list", "--config", missing.to_str().unwrap()])
        .fails()
        .stderr_has("failed to read config");
}

#[test]
fn missing_default_config_falls_back_to_defaults() {
    let ws = Workspace::new();
    ws.zm().args(&["project", "list"]).passes();
}
