//! Blocking HTTP transport.
//!
//! Sends operations to the platform REST API with a bearer token.

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use super::{Method, Operation, Transport};
use crate::core::cancel::Cancellation;
use crate::core::classify::ApiFailure;
use crate::core::config::PlatformConfig;
use crate::error::{ConfigError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport for the platform API.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport from platform settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingToken` if the token variable is unset.
    pub fn new(platform: &PlatformConfig) -> Result<Self> {
        let token = platform.token()?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("platsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "api_url",
                reason: e.to_string(),
            })?;

        debug!(api_url = %platform.api_url, "creating http transport");
        Ok(Self {
            client,
            base_url: platform.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, op: &Operation, cancel: &Cancellation) -> std::result::Result<Value, ApiFailure> {
        if cancel.is_cancelled() {
            return Err(ApiFailure::cancelled());
        }

        let method = match op.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = format!("{}{}", self.base_url, op.path);
        trace!(method = %op.method, url = %url, "sending request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.token)
            .query(&op.query);
        if let Some(body) = &op.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|e| ApiFailure::network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiFailure::network(e.to_string()))?;

        trace!(status = status.as_u16(), url = %url, "received response");
        if !status.is_success() {
            return Err(ApiFailure::from_response(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiFailure {
            status: Some(status.as_u16()),
            code: Some("invalid_json".to_string()),
            message: e.to_string(),
        })
    }
}
