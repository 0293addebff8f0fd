//! Help output specs

use crate::prelude::*;

#[test]
fn top_level_help_lists_command_groups() {
    let ws = Workspace::new();
    ws.zm()
        .args(&["--help"])
        .passes()
        .stdout_has("project")
        .stdout_has("baseline")
        .stdout_has("variance")
        .stdout_has("events");
}

#[test]
fn baseline_help_lists_lifecycle_commands() {
    let ws = Workspace::new();
    ws.zm()
        .args(&["baseline", "--help"])
        .passes()
        .stdout_has("rebaseline")
        .stdout_has("revert")
        .stdout_has("finalize")
        .stdout_has("compare");
}
