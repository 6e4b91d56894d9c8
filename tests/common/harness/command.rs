//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since not every test binary uses every helper
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Fluent wrapper around `assert_cmd::Command` for the `roamlinks` binary.
pub struct RoamCommand {
    args: Vec<String>,
    config_home: Option<PathBuf>,
    stdin: Option<String>,
}

impl RoamCommand {
    /// Creates a new command for the `roamlinks` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            config_home: None,
            stdin: None,
        }
    }

    /// Sets the `--dir` option to specify the workspace.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Points the binary's config lookup at `path`.
    pub fn config_home(mut self, path: &Path) -> Self {
        self.config_home = Some(path.to_path_buf());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Feeds `input` to the process on stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("roamlinks").expect("Failed to find roamlinks binary");
        cmd.args(&self.args).env_remove("RUST_LOG");
        if let Some(home) = &self.config_home {
            cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
        }
        if let Some(input) = self.stdin {
            cmd.write_stdin(input);
        }
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `index` command.
    pub fn index(self) -> Self {
        self.args(["index"])
    }

    /// Configures for the `backlinks` command.
    pub fn backlinks(self, file: &str) -> Self {
        self.args(["backlinks", file])
    }

    /// Configures for the `outlinks` command.
    pub fn outlinks(self, file: &str) -> Self {
        self.args(["outlinks", file])
    }

    /// Configures for the `search` command with a query.
    pub fn search(self, query: &str) -> Self {
        self.args(["search", query])
    }

    /// Configures for the `graph` command.
    pub fn graph(self) -> Self {
        self.args(["graph"])
    }

    /// Configures for the `stats` command.
    pub fn stats(self) -> Self {
        self.args(["stats"])
    }

    /// Configures for the `show` command with a path.
    pub fn show(self, file: &str) -> Self {
        self.args(["show", file])
    }

    /// Configures for the `serve` command.
    pub fn serve(self) -> Self {
        self.args(["serve"])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }

    /// Adds `--format paths` to the command.
    pub fn format_paths(self) -> Self {
        self.args(["--format", "paths"])
    }

    /// Adds `--snapshot FILE` to the command.
    pub fn snapshot(self, path: &Path) -> Self {
        self.args(["--snapshot".to_string(), path.to_string_lossy().to_string()])
    }
}

impl Default for RoamCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_builds_args_in_order() {
        let cmd = RoamCommand::new()
            .dir(Path::new("/tmp/notes"))
            .search("alpha")
            .format_json();
        assert_eq!(
            cmd.get_args(),
            ["--dir", "/tmp/notes", "search", "alpha", "--format", "json"]
        );
    }
}
