//! Tests for `platsync import-id` command.

use crate::support::*;

#[test]
fn test_three_segment_id() {
    let t = Test::new();

    let output = t.run(&["import-id", "team_x/prj_1/env_1"]);
    assert_success(&output);
    assert_stdout_contains(&output, "team_x");
    assert_stdout_contains(&output, "prj_1");
    assert_stdout_contains(&output, "env_1");
}

#[test]
fn test_two_segment_id_uses_default_team() {
    let t = Test::with_config(CONFIG);

    let output = t.run(&["import-id", "prj_1/env_1"]);
    assert_success(&output);
    assert_stdout_contains(&output, TEAM);
}

#[test]
fn test_two_segment_id_without_config_has_no_team() {
    let t = Test::new();

    let output = t.run(&["import-id", "prj_1/env_1"]);
    assert_success(&output);
    assert_stdout_contains(&output, "(none)");
}

#[test]
fn test_shared_and_team_ids() {
    let t = Test::new();

    let output = t.run(&["import-id", "--shared", "team_x/env_9"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Shared environment variable");
    assert_stdout_contains(&output, "env_9");

    let output = t.run(&["import-id", "--team", "team_x"]);
    assert_success(&output);
    assert_stdout_contains(&output, "team_x");
}

#[test]
fn test_malformed_ids_fail() {
    let t = Test::new();

    for id in ["", "a/b/c/d", "a//b", "only"] {
        let output = t.run(&["import-id", id]);
        assert_failure(&output);
        assert_stderr_contains(&output, "expected format");
    }

    let output = t.run(&["import-id", "--team", "a/b"]);
    assert_failure(&output);
}
