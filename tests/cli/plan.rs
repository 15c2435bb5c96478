//! Tests for `platsync plan` command.

use crate::support::*;

#[test]
fn test_plan_lists_changes_in_order() {
    let t = Test::with_config(CONFIG);
    t.write("remote.json", SNAPSHOT);

    let output = t.plan("remote.json");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Environment variables"));
    assert!(out.contains("+ API_KEY"));
    assert!(out.contains("+ DATABASE_URL [preview]@staging"));
    assert!(out.contains("~ DATABASE_URL [production]  env_db"));
    assert!(out.contains("- LEGACY [development]  env_old"));
    assert!(out.contains("~ member usr_bob  VIEWER -> DEVELOPER"));

    let create = out.find("+ API_KEY").unwrap();
    let delete = out.find("- LEGACY").unwrap();
    assert!(create < delete);
}

#[test]
fn test_plan_never_prints_values() {
    let t = Test::with_config(CONFIG);
    t.write("remote.json", SNAPSHOT);

    let output = t.plan("remote.json");
    assert_success(&output);
    assert_output_excludes(&output, "sk-live-123");
    assert_output_excludes(&output, "postgres://");
}

#[test]
fn test_plan_json() {
    let t = Test::with_config(CONFIG);
    t.write("remote.json", SNAPSHOT);

    let report = t.plan_json("remote.json");
    let env = report["env"].as_array().unwrap();
    let actions: Vec<&str> = env.iter().map(|c| c["action"].as_str().unwrap()).collect();
    assert_eq!(actions, vec!["create", "create", "update", "delete", "delete"]);
    assert!(env[0]["fingerprint"].as_str().unwrap().len() == 8);

    let members = report["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], "usr_bob");
    assert!(report["shared_env"].as_array().unwrap().is_empty());
    assert!(!report.to_string().contains("sk-live-123"));
}

#[test]
fn test_plan_in_sync_reports_no_changes() {
    let t = Test::with_config(&format!(
        "[platform]\ndefault_team = \"{}\"\n\n[project]\nid = \"{}\"\n",
        TEAM, PROJECT
    ));
    t.write("remote.json", r#"{ "envs": [] }"#);

    let output = t.plan("remote.json");
    assert_success(&output);
    assert_stdout_contains(&output, "no changes");
}

#[test]
fn test_plan_rejects_conflicting_entries() {
    let t = Test::with_config(
        r#"
[project]
id = "prj_web"

[[env]]
key = "A"
value = "1"
target = ["production", "preview"]

[[env]]
key = "A"
value = "2"
target = ["preview"]
"#,
    );
    t.write("remote.json", "{}");

    let output = t.plan("remote.json");
    assert_failure(&output);
    assert_stderr_contains(&output, "declared twice");
}

#[test]
fn test_plan_unknown_member_fails() {
    let t = Test::with_config(CONFIG);
    t.write(
        "remote.json",
        r#"{ "members": [{ "uid": "usr_alice", "role": "OWNER", "confirmed": true }] }"#,
    );

    let output = t.plan("remote.json");
    assert_failure(&output);
    assert_stderr_contains(&output, "usr_bob");
}
