use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reference date every command runs with. A Monday.
pub const TODAY: &str = "2024-05-06";

/// Test harness for running CLI commands against a temporary tree file
pub struct CliTestHarness {
    temp_dir: TempDir,
    tree_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty tree
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let tree_path = temp_dir.path().join("tree.json");

        Self {
            temp_dir,
            tree_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        self.command_at(TODAY)
    }

    /// Like [`command`](Self::command), with a different reference date
    pub fn command_at(&self, today: &str) -> Command {
        let mut cmd = Command::cargo_bin("arbor").expect("Failed to find arbor binary");
        cmd.current_dir(self.temp_dir.path())
            .env_remove("RUST_LOG")
            .arg("--file")
            .arg(&self.tree_path)
            .arg("--today")
            .arg(today);
        cmd
    }

    pub fn tree_path(&self) -> &Path {
        &self.tree_path
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// The persisted tree as raw JSON
    pub fn tree_json(&self) -> Value {
        let raw = std::fs::read_to_string(&self.tree_path).expect("tree file exists");
        serde_json::from_str(&raw).expect("tree file is valid JSON")
    }

    /// The persisted node whose text is `text`
    pub fn node(&self, text: &str) -> Value {
        fn search(nodes: &Value, text: &str) -> Option<Value> {
            nodes.as_array()?.iter().find_map(|node| {
                if node["text"] == text {
                    Some(node.clone())
                } else {
                    search(&node["children"], text)
                }
            })
        }
        search(&self.tree_json(), text).unwrap_or_else(|| panic!("no task with text '{text}'"))
    }

    /// Full id of the task whose text is `text`
    pub fn id_of(&self, text: &str) -> String {
        self.node(text)["id"]
            .as_str()
            .expect("string id")
            .to_string()
    }

    /// Adds a task and returns its id
    pub fn add(&self, text: &str, extra: &[&str]) -> String {
        let mut args = vec!["add", text];
        args.extend_from_slice(extra);
        self.run_success(&args);
        self.id_of(text)
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Task"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Created task"))
    }

    /// Predicate to check for empty result set
    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }
}
