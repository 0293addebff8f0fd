//! Re-baseline lifecycle specs

use crate::prelude::*;

fn rebaseline(ws: &Workspace, reason: &str, end: &str, cost: &str) -> serde_json::Value {
    ws.json(&[
        "baseline", "rebaseline", "p1", "--type", "contract", "--start", "2026-01-01", "--end",
        end, "--cost", cost, "--reason", reason,
    ])
}

#[test]
fn rebaseline_creates_next_version_with_history() {
    let ws = Workspace::new();
    let v1 = ws.project_with_baseline("p1");

    let outcome = rebaseline(&ws, "scope change", "2026-04-21", "12000");
    assert_eq!(outcome["baseline"]["version"], 2);
    assert_eq!(outcome["history"]["from_version"], 1);
    assert_eq!(outcome["history"]["to_version"], 2);
    assert_eq!(outcome["history"]["note"], "scope change");
    assert_eq!(outcome["variance"]["baselineId"], v1.as_str());

    let events = events(&ws, "Project.Baseline.Rebaselined");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["oldVersion"], 1);
    assert_eq!(events[0]["newVersion"], 2);
    assert_eq!(events[0]["direction"], "upgrade");
    assert_eq!(events[0]["reason"], "scope change");

    let active = ws.json(&["baseline", "active", "p1", "--type", "contract"]);
    assert_eq!(active["version"], 2);
    let old = ws.json(&["baseline", "list", "p1"]);
    assert_eq!(old[0]["locked"], true);
}

#[test]
fn sequential_rebaselines_have_no_gaps() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");

    for n in 0..4 {
        let outcome = rebaseline(&ws, &format!("change {}", n), "2026-04-11", "10000");
        assert_eq!(outcome["baseline"]["version"], n + 2);
    }

    let history = ws.json(&["baseline", "history", "p1"]);
    let pairs: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| (h["from_version"].as_u64(), h["to_version"].as_u64()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some(1), Some(2)),
            (Some(2), Some(3)),
            (Some(3), Some(4)),
            (Some(4), Some(5)),
        ]
    );
}

#[test]
fn stale_expected_version_is_a_conflict() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");
    rebaseline(&ws, "first", "2026-04-11", "10000");

    ws.zm()
        .args(&["baseline", "rebaseline", "p1", "--type", "contract"])
        .args(&["--start", "2026-01-01", "--end", "2026-04-11", "--cost", "1"])
        .args(&["--reason", "late", "--expected-version", "1"])
        .fails()
        .stderr_has("conflict")
        .stderr_has("retry");

    let active = ws.json(&["baseline", "active", "p1", "--type", "contract"]);
    assert_eq!(active["version"], 2);
}

#[test]
fn rebaseline_requires_a_reason() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");
    ws.zm()
        .args(&["baseline", "rebaseline", "p1", "--type", "contract"])
        .args(&["--start", "2026-01-01", "--end", "2026-04-11", "--cost", "1"])
        .args(&["--reason", "  "])
        .fails()
        .stderr_has("validation failed");
}

#[test]
fn revert_reactivates_an_older_version() {
    let ws = Workspace::new();
    ws.project_with_baseline("p1");
    rebaseline(&ws, "scope change", "2026-04-21", "12000");

    let reverted = ws.json(&[
        "baseline", "revert", "p1", "--type", "contract", "--to", "1", "--reason", "client backed out",
    ]);
    assert_eq!(reverted["baseline"]["version"], 1);
    assert_eq!(reverted["history"]["from_version"], 2);
    assert_eq!(reverted["history"]["to_version"], 1);

    let events = events(&ws, "Project.Baseline.Rebaselined");
    assert_eq!(events[1]["direction"], "downgrade");

    // Versions are never reused after a revert
    let next = rebaseline(&ws, "new scope", "2026-05-01", "13000");
    assert_eq!(next["baseline"]["version"], 3);
}

#[test]
fn finalized_baseline_rejects_updates() {
    let ws = Workspace::new();
    let id = ws.project_with_baseline("p1");

    let locked = ws.json(&["baseline", "finalize", &id]);
    assert_eq!(locked["locked"], true);

    ws.zm()
        .args(&["baseline", "update", &id, "--cost", "9000"])
        .fails()
        .stderr_has("is locked");
}

#[test]
fn update_records_changed_fields() {
    let ws = Workspace::new();
    let id = ws.project_with_baseline("p1");

    let updated = ws.json(&["baseline", "update", &id, "--cost", "11000"]);
    assert_eq!(updated["plan"]["planned_cost"].as_f64(), Some(11000.0));

    let events = events(&ws, "Project.Baseline.Updated");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["changedFields"], serde_json::json!(["plannedCost"]));
}
