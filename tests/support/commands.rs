//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a platsync command running in the test project directory.
    ///
    /// Logging and config overrides from the outer environment are cleared.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("platsync").expect("failed to find platsync binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("PLATSYNC_LOG");
        cmd.env_remove("PLATSYNC_CONFIG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Run platsync with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run platsync")
    }

    /// Shortcut for `platsync init`.
    pub fn init_cmd(&self, project: &str, team: &str) -> Output {
        self.run(&["init", "--project", project, "--team", team])
    }

    /// Shortcut for `platsync plan --remote <file>`.
    pub fn plan(&self, remote: &str) -> Output {
        self.run(&["plan", "--remote", remote])
    }

    /// Shortcut for `platsync plan --remote <file> --json`.
    pub fn plan_json(&self, remote: &str) -> serde_json::Value {
        let output = self.run(&["plan", "--remote", remote, "--json"]);
        super::assert_success(&output);
        serde_json::from_slice(&output.stdout).expect("plan --json should print JSON")
    }
}
