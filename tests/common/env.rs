//! Isolated test environment for running the `stevedore` binary.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use stevedore::infrastructure::runtime::RuntimeState;
use stevedore::{ServiceGraph, StateFileRuntime};

pub const GRAPH_FILE: &str = "graph.json";
pub const STATE_FILE: &str = "state/runtime.json";

/// Result of running the CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}):\n{}", e, self.combined_output()))
    }
}

/// Temp directory holding a graph file and a runtime state file
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn with_graph(graph: &ServiceGraph) -> Self {
        let env = Self::new();
        env.write_graph(graph);
        env
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write_graph(&self, graph: &ServiceGraph) {
        let json = serde_json::to_string_pretty(graph).expect("graph serializes");
        self.write_file(GRAPH_FILE, &json);
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create directories");
        }
        std::fs::write(path, content).expect("failed to write file");
    }

    pub fn runtime(&self) -> StateFileRuntime {
        StateFileRuntime::new(self.path(STATE_FILE))
    }

    pub fn state(&self) -> RuntimeState {
        self.runtime().load().expect("state file readable")
    }

    /// Run `stevedore <args> --graph graph.json --state state/runtime.json`
    pub fn run(&self, args: &[&str]) -> TestResult {
        let mut full: Vec<&str> = args.to_vec();
        full.extend(["--graph", GRAPH_FILE, "--state", STATE_FILE]);
        self.run_raw(&full)
    }

    /// Run the binary with exactly these arguments
    pub fn run_raw(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_stevedore"))
            .current_dir(self.root.path())
            .args(args)
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.path(".config"))
            .env("NO_COLOR", "1")
            .env_remove("STEVEDORE_LOG")
            .env_remove("STEVEDORE_TIMEOUT_SECS")
            .env_remove("STEVEDORE_ALLOW_RECREATE")
            .env_remove("STEVEDORE_BUILD")
            .env_remove("STEVEDORE_WANT_DIFF")
            .output()
            .expect("failed to execute stevedore");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
