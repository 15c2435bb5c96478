//! Tests for `platsync link` command.

use crate::support::*;

#[test]
fn test_github_project_payload() {
    let t = Test::new();
    t.write(
        "project.json",
        r#"{ "id": "prj_1", "link": { "type": "github", "org": "acme", "repo": "web", "productionBranch": "main" } }"#,
    );

    let output = t.run(&["link", "project.json"]);
    assert_success(&output);
    assert_stdout_contains(&output, "github");
    assert_stdout_contains(&output, "acme/web");
    assert_stdout_contains(&output, "main");
}

#[test]
fn test_gitlab_link_strips_git_suffix() {
    let t = Test::new();
    t.write(
        "link.json",
        r#"{ "type": "gitlab", "projectNamespace": "acme", "projectUrl": "https://gitlab.com/acme/web.git" }"#,
    );

    let output = t.run(&["link", "link.json", "--json"]);
    assert_success(&output);
    let link: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(link["provider"], "gitlab");
    assert_eq!(link["slug"], "acme/web");
}

#[test]
fn test_unknown_provider_is_not_an_error() {
    let t = Test::new();
    t.write("link.json", r#"{ "type": "svn", "url": "svn://example" }"#);

    let output = t.run(&["link", "link.json"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no supported repository link");
}

#[test]
fn test_missing_payload_fails() {
    let t = Test::new();

    let output = t.run(&["link", "nope.json"]);
    assert_failure(&output);
}
