//! Remote failure classification.
//!
//! Every failure coming back from the transport is classified exactly once.
//! The resulting [`FailureKind`] decides whether the orchestrator swallows it
//! (a missing resource on read or delete) or propagates it.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Outcome category of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The resource does not exist upstream.
    NotFound,
    /// Transient network or server-side condition.
    Retryable,
    /// Anything else.
    Fatal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::NotFound => "not found",
            FailureKind::Retryable => "retryable",
            FailureKind::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// A raw failure reported by the transport.
///
/// `status` is `None` when no HTTP response was received at all
/// (connection refused, timeout, cancelled request), or when a successful
/// response still reported a rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiFailure {
    /// Build a failure from an HTTP status and response body.
    ///
    /// The platform reports errors as `{"error": {"code": ..., "message": ...}}`;
    /// bodies that don't match are kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status: Some(status),
                code: envelope.error.code,
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| body.trim().to_string()),
            },
            Err(_) => Self {
                status: Some(status),
                code: None,
                message: body.trim().to_string(),
            },
        }
    }

    /// A failure with an HTTP status and a structured error code.
    pub fn with_status(status: u16, code: &str, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: Some(code.to_string()),
            message: message.into(),
        }
    }

    /// A failure where no response was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// The first entry of a create response's `failed` list, if any.
    ///
    /// Bulk create endpoints answer 2xx and report per-entry rejections as
    /// `{"created": [...], "failed": [{"error": {"code": ..., "message": ...}}]}`.
    pub fn from_rejected(response: &Value) -> Option<Self> {
        let entry = response.get("failed")?.as_array()?.first()?;
        let failure = match serde_json::from_value::<ErrorEnvelope>(entry.clone()) {
            Ok(envelope) => Self {
                status: None,
                code: Some(envelope.error.code.unwrap_or_else(|| "rejected".to_string())),
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| "rejected by the platform".to_string()),
            },
            Err(_) => Self {
                status: None,
                code: Some("rejected".to_string()),
                message: entry.to_string(),
            },
        };
        Some(failure)
    }

    /// A successful response whose body could not be decoded.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some("invalid_response".to_string()),
            message: message.into(),
        }
    }

    /// The request was abandoned because the caller cancelled it.
    pub fn cancelled() -> Self {
        Self {
            status: None,
            code: Some("cancelled".to_string()),
            message: "request cancelled".to_string(),
        }
    }

    /// Classify this failure.
    pub fn kind(&self) -> FailureKind {
        classify(self)
    }

    /// Whether the remote reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        self.kind() == FailureKind::NotFound
    }

    /// Whether this is the failure produced by [`cancelled`](Self::cancelled).
    pub fn is_cancelled(&self) -> bool {
        self.status.is_none() && self.code.as_deref() == Some("cancelled")
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.code) {
            (Some(status), Some(code)) => write!(f, "HTTP {} ({}): {}", status, code, self.message),
            (Some(status), None) => write!(f, "HTTP {}: {}", status, self.message),
            (None, _) => write!(f, "{}", self.message),
        }
    }
}

/// Classify a raw failure.
pub fn classify(failure: &ApiFailure) -> FailureKind {
    if failure.status == Some(404) || failure.code.as_deref().is_some_and(is_not_found_code) {
        return FailureKind::NotFound;
    }

    match failure.status {
        None if failure.code.is_none() || failure.is_cancelled() => FailureKind::Retryable,
        None => FailureKind::Fatal,
        Some(429) | Some(500..=599) => FailureKind::Retryable,
        Some(_) => FailureKind::Fatal,
    }
}

fn is_not_found_code(code: &str) -> bool {
    let code = code.to_ascii_lowercase();
    code == "not_found" || code.ends_with("_not_found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_404_is_not_found() {
        let f = ApiFailure::from_response(404, "");
        assert_eq!(classify(&f), FailureKind::NotFound);
        assert!(f.is_not_found());
    }

    #[test]
    fn test_structured_not_found_code() {
        let body = r#"{"error":{"code":"project_not_found","message":"Project not found"}}"#;
        let f = ApiFailure::from_response(400, body);
        assert_eq!(f.code.as_deref(), Some("project_not_found"));
        assert_eq!(f.message, "Project not found");
        assert_eq!(classify(&f), FailureKind::NotFound);
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert_eq!(
            classify(&ApiFailure::from_response(503, "unavailable")),
            FailureKind::Retryable
        );
        assert_eq!(
            classify(&ApiFailure::from_response(429, "slow down")),
            FailureKind::Retryable
        );
        assert_eq!(
            classify(&ApiFailure::network("connection reset")),
            FailureKind::Retryable
        );
    }

    #[test]
    fn test_other_client_errors_are_fatal_and_keep_message() {
        let body = r#"{"error":{"code":"forbidden","message":"Not authorized"}}"#;
        let f = ApiFailure::from_response(403, body);
        assert_eq!(classify(&f), FailureKind::Fatal);
        assert_eq!(f.to_string(), "HTTP 403 (forbidden): Not authorized");
    }

    #[test]
    fn test_rejected_create_entry_is_classified() {
        let response = serde_json::json!({
            "created": [],
            "failed": [{"error": {"code": "ENV_CONFLICT", "message": "already exists"}}]
        });
        let f = ApiFailure::from_rejected(&response).unwrap();
        assert_eq!(f.code.as_deref(), Some("ENV_CONFLICT"));
        assert_eq!(f.to_string(), "already exists");
        assert_eq!(classify(&f), FailureKind::Fatal);

        let missing = serde_json::json!({
            "failed": [{"error": {"code": "project_not_found", "message": "gone"}}]
        });
        assert!(ApiFailure::from_rejected(&missing).unwrap().is_not_found());
    }

    #[test]
    fn test_no_rejection_without_failed_entries() {
        assert!(ApiFailure::from_rejected(&serde_json::json!({"created": [], "failed": []})).is_none());
        assert!(ApiFailure::from_rejected(&serde_json::json!({"created": {"id": "env_1"}})).is_none());
    }

    #[test]
    fn test_unrecognised_rejection_keeps_the_entry() {
        let f = ApiFailure::from_rejected(&serde_json::json!({"failed": ["nope"]})).unwrap();
        assert_eq!(f.code.as_deref(), Some("rejected"));
        assert_eq!(f.message, "\"nope\"");
    }

    #[test]
    fn test_status_less_failures() {
        assert_eq!(
            classify(&ApiFailure::invalid_response("missing field `id`")),
            FailureKind::Fatal
        );
        assert_eq!(classify(&ApiFailure::cancelled()), FailureKind::Retryable);
    }

    #[test]
    fn test_unstructured_body_is_kept_verbatim() {
        let f = ApiFailure::from_response(400, "  bad request\n");
        assert_eq!(f.code, None);
        assert_eq!(f.to_string(), "HTTP 400: bad request");
    }
}
