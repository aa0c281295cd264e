//! Error types
//!
//! Deterministic failures (unsupported provider or operation, missing
//! credentials) are never retried. Provider I/O failures are retried and
//! then surfaced with the last underlying cause attached.

use crate::cloud::http::GatewayStatus;
use crate::cloud::Provider;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::ResourceFetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Missing required fields for {provider}: {}", .fields.join(", "))]
    MissingFields {
        provider: Provider,
        fields: Vec<String>,
    },

    #[error("Fetch logic for {provider} is not implemented for resource {resource_id}")]
    UnsupportedOperation {
        provider: Provider,
        resource_id: String,
    },

    #[error("No client initialized for {0}")]
    ClientNotInitialized(Provider),

    #[error("Error initializing client for {provider}")]
    ClientInit {
        provider: Provider,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error fetching {resource_id} from {provider}")]
    Fetch {
        provider: Provider,
        resource_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FetchError {
    /// Whether retrying the same request could produce a different outcome
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::ClientInit { .. } | FetchError::Fetch { .. })
    }
}

/// Format a fetch error for display
///
/// Security: gateway status failures are mapped to generic messages so raw
/// gateway responses never reach the terminal. Other causes are sanitized and
/// truncated.
pub fn format_fetch_error(error: &FetchError) -> String {
    let source = match error {
        FetchError::ClientInit { source, .. } | FetchError::Fetch { source, .. } => source,
        other => return other.to_string(),
    };

    let status = source
        .chain()
        .find_map(|cause| cause.downcast_ref::<GatewayStatus>())
        .map(|status| status.0);

    let friendly = match status {
        Some(StatusCode::UNAUTHORIZED) => {
            Some("Authentication failed. Check the configured credentials.")
        }
        Some(StatusCode::FORBIDDEN) => {
            Some("Permission denied. Check the provider's access policy.")
        }
        Some(StatusCode::NOT_FOUND) => Some("Resource not found."),
        Some(StatusCode::TOO_MANY_REQUESTS) => Some("Rate limit exceeded. Please try again later."),
        Some(status) if status.is_server_error() => {
            Some("Provider temporarily unavailable. Please try again.")
        }
        _ => None,
    };

    if let Some(friendly) = friendly {
        return format!("{}: {}", error, friendly);
    }

    let cause = format!("{:#}", source);
    let sanitized: String = cause
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect();
    if sanitized.len() < cause.len() {
        format!("{}: {}...", error, sanitized)
    } else {
        format!("{}: {}", error, sanitized)
    }
}
