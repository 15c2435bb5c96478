//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "platsync");
}

#[test]
fn test_apply_help_warns_about_shared_deletes() {
    let t = Test::new();

    let output = t.cmd().args(["apply", "--help"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "every shared variable of the team");
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_plan_without_config_suggests_init() {
    let t = Test::new();
    t.write("remote.json", "{}");

    let output = t.plan("remote.json");
    assert_failure(&output);
    assert_stderr_contains(&output, "not initialized");
    assert_stderr_contains(&output, "platsync init");
}

#[test]
fn test_invalid_config_is_reported() {
    let t = Test::with_config("[[env]]\nkey = 1\n");
    t.write("remote.json", "{}");

    let output = t.plan("remote.json");
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let t = Test::with_config(CONFIG);
    t.write("remote.json", SNAPSHOT);

    let output = t
        .cmd()
        .args(["--verbose", "plan", "--remote", "remote.json", "--json"])
        .output()
        .unwrap();
    assert_success(&output);
    // stdout stays machine-readable
    serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap();
    assert_output_excludes(&output, "sk-live-123");
}

#[cfg(not(feature = "http"))]
#[test]
fn test_apply_requires_http_feature() {
    let t = Test::with_config(CONFIG);

    let output = t.run(&["apply"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "http");
}

#[test]
fn test_completions() {
    let t = Test::new();

    for shell in ["bash", "zsh", "fish", "power-shell"] {
        t.cmd()
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("platsync"));
    }
}

#[test]
fn test_missing_token_is_named() {
    let t = Test::with_config(CONFIG);

    t.cmd()
        .arg("apply")
        .env_remove("PLATSYNC_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLATSYNC_TOKEN").or(predicate::str::contains("http")));
}
