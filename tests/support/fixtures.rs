//! Test fixtures and constants.

use platsync::core::domain::{EnvironmentVariable, Role, Target};
use platsync::{MemoryPlatform, Orchestrator, PlatformConfig};

pub const PROJECT: &str = "prj_web";
pub const TEAM: &str = "team_acme";

/// A config with two env vars, a branch override and one member role.
pub const CONFIG: &str = r#"
[platform]
default_team = "team_acme"

[project]
id = "prj_web"

[[env]]
key = "DATABASE_URL"
value = "postgres://prod/db"
target = ["production"]

[[env]]
key = "DATABASE_URL"
value = "postgres://staging/db"
target = ["preview"]
git_branch = "staging"

[[env]]
key = "API_KEY"
value = "sk-live-123"
target = ["production", "preview"]

[[members]]
uid = "usr_bob"
role = "DEVELOPER"
"#;

/// Remote state for CONFIG: API_KEY exists for production only, a stray
/// variable exists, and bob is a viewer.
pub const SNAPSHOT: &str = r#"{
    "project": {
        "id": "prj_web",
        "name": "web",
        "link": { "type": "github", "org": "acme", "repo": "web", "productionBranch": "main" }
    },
    "envs": {
        "envs": [
            { "id": "env_db", "key": "DATABASE_URL", "target": ["production"], "type": "encrypted", "value": "zzz" },
            { "id": "env_api", "key": "API_KEY", "target": "production", "type": "encrypted", "value": "zzz" },
            { "id": "env_old", "key": "LEGACY", "target": ["development"], "type": "plain", "value": "x" }
        ]
    },
    "members": {
        "members": [
            { "uid": "usr_alice", "role": "OWNER", "confirmed": true, "email": "alice@example.com" },
            { "uid": "usr_bob", "role": "VIEWER", "confirmed": true, "email": "bob@example.com" }
        ]
    }
}"#;

/// Platform settings with the test team as default.
pub fn platform_config() -> PlatformConfig {
    PlatformConfig {
        default_team: Some(TEAM.to_string()),
        ..PlatformConfig::default()
    }
}

/// A memory platform with the test project and team registered.
pub fn seeded_platform() -> MemoryPlatform {
    let platform = MemoryPlatform::new();
    platform.add_project(
        PROJECT,
        Some(serde_json::json!({
            "type": "gitlab",
            "projectNamespace": "acme",
            "projectUrl": "https://gitlab.com/acme/web.git",
            "productionBranch": "main"
        })),
    );
    platform.add_team(TEAM);
    platform.add_member(TEAM, "usr_alice", Role::Owner, true);
    platform.add_member(TEAM, "usr_bob", Role::Viewer, false);
    platform
}

/// An orchestrator over `platform` with the default platform settings.
pub fn orchestrator(platform: &MemoryPlatform) -> Orchestrator<&MemoryPlatform> {
    Orchestrator::new(platform, platform_config())
}

pub fn var(key: &str, value: &str, targets: &[Target]) -> EnvironmentVariable {
    EnvironmentVariable::new(key, value, targets.iter().copied()).in_project(PROJECT)
}
