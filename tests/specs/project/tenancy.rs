//! Tenant isolation specs

use crate::prelude::*;

#[test]
fn other_tenants_cannot_see_a_project() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1")]);

    ws.zm_as("globex")
        .args(&["project", "list"])
        .passes()
        .stdout_eq("No projects\n");
    ws.zm_as("globex")
        .args(&["project", "show", "p1"])
        .fails()
        .stderr_has("project not found: p1");
    ws.zm_as("globex")
        .args(&["task", "progress", "p1", "t1", "100"])
        .fails()
        .stderr_has("project not found: p1");
}

#[test]
fn events_are_scoped_to_the_tenant() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1")]);
    ws.zm().args(&["task", "progress", "p1", "t1", "100"]).passes();

    assert!(!events(&ws, "**").is_empty());
    ws.zm_as("globex")
        .args(&["events"])
        .passes()
        .stdout_eq("No events\n");
}

#[test]
fn deleted_project_disappears() {
    let ws = Workspace::new();
    ws.project_with_tasks("p1", &[("t1", "1")]);
    ws.zm()
        .args(&["project", "delete", "p1"])
        .passes()
        .stdout_eq("Deleted project p1\n");
    ws.zm()
        .args(&["project", "show", "p1"])
        .fails()
        .stderr_has("project not found: p1");
}
