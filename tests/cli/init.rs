//! Tests for `platsync init` command.

use crate::support::*;

#[test]
fn test_init_writes_config() {
    let t = Test::new();

    let output = t.init_cmd(PROJECT, TEAM);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");
    assert_stdout_contains(&output, "$PLATSYNC_TOKEN");

    let contents = t.read(".platsync.toml");
    assert!(contents.contains(PROJECT));
    assert!(contents.contains(TEAM));
}

#[test]
fn test_init_without_arguments() {
    let t = Test::new();

    let output = t.run(&["init"]);
    assert_success(&output);
    assert!(t.dir.path().join(".platsync.toml").exists());
}

#[test]
fn test_init_twice_fails() {
    let t = Test::new();
    assert_success(&t.init_cmd(PROJECT, TEAM));

    let output = t.init_cmd(PROJECT, TEAM);
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
}

#[test]
fn test_init_honors_config_flag() {
    let t = Test::new();

    let output = t.run(&["--config", "custom.toml", "init", "--project", PROJECT]);
    assert_success(&output);
    assert!(t.dir.path().join("custom.toml").exists());
    assert!(!t.dir.path().join(".platsync.toml").exists());
}
