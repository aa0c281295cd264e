//! HTTP utilities for inventory gateway REST calls

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Per-request timeout; a hung gateway counts as a failed attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Non-success HTTP status returned by a gateway
#[derive(Debug, thiserror::Error)]
#[error("Gateway request failed: {0}")]
pub struct GatewayStatus(pub StatusCode);

/// HTTP client wrapper for gateway calls
#[derive(Clone)]
pub struct GatewayHttpClient {
    client: Client,
}

impl GatewayHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cloudscope/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request authenticated with basic auth
    pub async fn get(
        &self,
        url: Url,
        username: &str,
        password: &str,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .basic_auth(username, Some(password))
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("Gateway error: {} - {}", status, sanitize_for_log(&body));
            return Err(GatewayStatus(status).into());
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}
