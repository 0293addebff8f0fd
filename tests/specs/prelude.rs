//! Shared helpers for the CLI specs

#![allow(dead_code)]

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

/// Date every spec pins as "today"
pub const TODAY: &str = "2026-02-20";

/// A throwaway store directory plus the environment the CLI runs in
pub struct Workspace {
    dir: TempDir,
    tenant: String,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
            tenant: "acme".to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the store directory
    pub fn file(&self, rel: &str, content: &str) {
        std::fs::write(self.dir.path().join(rel), content).expect("write file");
    }

    /// Run zm as the default tenant
    pub fn zm(&self) -> Zm {
        self.zm_as(&self.tenant)
    }

    /// Run zm as another tenant against the same store
    pub fn zm_as(&self, tenant: &str) -> Zm {
        let mut cmd = assert_cmd::Command::new(zm_binary());
        for var in ["ZM_CONFIG", "ZM_ACTOR", "ZM_LOG"] {
            cmd.env_remove(var);
        }
        cmd.env("ZM_STORE", self.dir.path())
            .env("ZM_TENANT", tenant)
            .env("ZM_TODAY", TODAY);
        Zm { cmd }
    }

    /// Run a command with `--format json` and parse its stdout
    pub fn json(&self, args: &[&str]) -> Value {
        self.zm().args(args).args(&["--format", "json"]).passes().json()
    }

    /// Create a project with one component and the given `(task, hours)` list
    pub fn project_with_tasks(&self, project: &str, tasks: &[(&str, &str)]) {
        self.zm()
            .args(&["project", "create", "--id", project, "--name", project])
            .args(&["--budget", "10000"])
            .passes();
        self.zm()
            .args(&["component", "add", project, "--id", "c1", "--name", "Foundations"])
            .passes();
        for (task, hours) in tasks {
            self.zm()
                .args(&["task", "add", project, "--id", task, "--name", task])
                .args(&["--component", "c1", "--hours", hours])
                .passes();
        }
    }

    /// Create a project with a contract baseline and return the baseline ID
    pub fn project_with_baseline(&self, project: &str) -> String {
        self.project_with_tasks(project, &[("t1", "1"), ("t2", "1")]);
        let baseline = self.json(&[
            "baseline", "create", project, "--type", "contract", "--start", "2026-01-01",
            "--end", "2026-04-11", "--cost", "10000",
        ]);
        baseline["id"].as_str().unwrap().to_string()
    }
}

fn zm_binary() -> PathBuf {
    // target/<profile>/deps/specs-<hash> -> target/<profile>/zm
    let exe = std::env::current_exe().expect("current exe");
    let profile_dir = exe
        .parent()
        .and_then(Path::parent)
        .expect("test binary lives under target/<profile>/deps");
    profile_dir.join(format!("zm{}", std::env::consts::EXE_SUFFIX))
}

pub struct Zm {
    cmd: assert_cmd::Command,
}

impl Zm {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().expect("run zm");
        let run = Run { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Run {
        let output = self.cmd.output().expect("run zm");
        let run = Run { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}",
            run.stdout()
        );
        run
    }
}

pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {:?}:\n{}", needle, stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {:?}:\n{}", needle, stderr);
        self
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout()).expect("stdout is JSON")
    }
}

/// Event payloads from `zm events --pattern <pattern>`, oldest first
pub fn events(ws: &Workspace, pattern: &str) -> Vec<Value> {
    let records = ws.json(&["events", "--pattern", pattern]);
    records
        .as_array()
        .expect("event list")
        .iter()
        .map(|r| r["event"]["payload"].clone())
        .collect()
}
