//! Repository links.
//!
//! Each VCS provider returns a differently shaped link payload. They are
//! decoded into [`RawLink`] and normalized into one [`RepositoryLink`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// A supported VCS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
            Provider::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-tagged link payload, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawLink {
    #[serde(rename_all = "camelCase")]
    Github {
        org: String,
        repo: String,
        #[serde(default)]
        production_branch: Option<String>,
    },
    /// GitLab never returns the repository name, only the namespace and URL.
    #[serde(rename_all = "camelCase")]
    Gitlab {
        project_namespace: String,
        project_url: String,
        #[serde(default)]
        production_branch: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Bitbucket {
        owner: String,
        slug: String,
        #[serde(default)]
        production_branch: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// A normalized repository link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryLink {
    pub provider: Provider,
    /// `owner/repo`.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_branch: Option<String>,
}

impl RawLink {
    /// Normalize into a provider-independent link.
    ///
    /// Unknown providers yield `None`.
    pub fn normalize(&self) -> Option<RepositoryLink> {
        match self {
            RawLink::Github {
                org,
                repo,
                production_branch,
            } => Some(RepositoryLink {
                provider: Provider::Github,
                slug: format!("{}/{}", org, repo),
                production_branch: production_branch.clone(),
            }),
            RawLink::Gitlab {
                project_namespace,
                project_url,
                production_branch,
            } => Some(RepositoryLink {
                provider: Provider::Gitlab,
                slug: format!("{}/{}", project_namespace, repo_name_from_url(project_url)),
                production_branch: production_branch.clone(),
            }),
            RawLink::Bitbucket {
                owner,
                slug,
                production_branch,
            } => Some(RepositoryLink {
                provider: Provider::Bitbucket,
                slug: format!("{}/{}", owner, slug),
                production_branch: production_branch.clone(),
            }),
            RawLink::Unknown => None,
        }
    }
}

/// Extract a repository name from a clone URL.
///
/// Strips one trailing `.git` and returns whatever follows the last `/`.
/// A URL ending in `/` therefore yields an empty name.
pub fn repo_name_from_url(url: &str) -> &str {
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.rsplit('/').next().unwrap_or(url)
}

/// Extract the repository link from a project payload.
///
/// Returns `None` when the project has no link or the provider is unknown.
///
/// # Errors
///
/// Returns a decode error if a known provider's payload is malformed.
pub fn link_from_project(project: &Value) -> Result<Option<RepositoryLink>> {
    match project.get("link") {
        None | Some(Value::Null) => Ok(None),
        Some(link) => parse_link(link),
    }
}

/// Normalize a bare link payload.
pub fn parse_link(link: &Value) -> Result<Option<RepositoryLink>> {
    if link.get("type").is_none() {
        return Ok(None);
    }
    let raw: RawLink = serde_json::from_value(link.clone())?;
    Ok(raw.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_github_slug() {
        let link = parse_link(&json!({
            "type": "github", "org": "acme", "repo": "widgets", "productionBranch": "main"
        }))
        .unwrap()
        .unwrap();

        assert_eq!(link.provider, Provider::Github);
        assert_eq!(link.slug, "acme/widgets");
        assert_eq!(link.production_branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_gitlab_slug_from_url() {
        let link = parse_link(&json!({
            "type": "gitlab",
            "projectNamespace": "acme",
            "projectUrl": "https://gitlab.com/acme/widgets.git",
            "projectId": "1234"
        }))
        .unwrap()
        .unwrap();

        assert_eq!(link.provider, Provider::Gitlab);
        assert_eq!(link.slug, "acme/widgets");
        assert_eq!(link.production_branch, None);
    }

    #[test]
    fn test_gitlab_url_shapes() {
        assert_eq!(repo_name_from_url("https://gitlab.com/acme/widgets"), "widgets");
        assert_eq!(repo_name_from_url("https://gitlab.com/acme/widgets.git"), "widgets");
        assert_eq!(repo_name_from_url("https://gitlab.com/acme/widgets/"), "");
        assert_eq!(repo_name_from_url("widgets.git"), "widgets");
    }

    #[test]
    fn test_bitbucket_slug() {
        let link = parse_link(&json!({
            "type": "bitbucket", "owner": "team", "slug": "service"
        }))
        .unwrap()
        .unwrap();
        assert_eq!(link.provider, Provider::Bitbucket);
        assert_eq!(link.slug, "team/service");
    }

    #[test]
    fn test_unknown_or_missing_provider_is_no_link() {
        assert_eq!(parse_link(&json!({ "type": "azure", "repo": "x" })).unwrap(), None);
        assert_eq!(parse_link(&json!({ "repo": "x" })).unwrap(), None);
        assert_eq!(link_from_project(&json!({ "id": "p", "link": null })).unwrap(), None);
        assert_eq!(link_from_project(&json!({ "id": "p" })).unwrap(), None);
    }

    #[test]
    fn test_malformed_known_provider_is_an_error() {
        assert!(parse_link(&json!({ "type": "github", "org": "acme" })).is_err());
    }
}
