//! Cloud provider interaction module
//!
//! This module defines the providers cloudscope knows about and the boundary
//! between the fetch pipeline and whatever actually talks to a provider.
//!
//! # Module Structure
//!
//! - [`client`] - `ProviderConnector` / `ProviderClient` traits
//! - [`gateway`] - Inventory gateway implementation of the client traits
//! - [`http`] - HTTP utilities for gateway REST calls
//!
//! # Example
//!
//! ```ignore
//! use cloudscope::cloud::{gateway::GatewayConnector, Provider};
//!
//! let connector = GatewayConnector::new(Provider::Aws, Some("https://inventory.internal/aws"));
//! let client = connector.connect(&record).await?;
//! ```

pub mod client;
pub mod gateway;
pub mod http;

pub use client::{ProviderClient, ProviderConnector};

use crate::error::FetchError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource details payload as returned by a provider
pub type ResourceDetails = serde_json::Value;

/// Supported cloud providers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    Oracle,
    Ibm,
}

impl Provider {
    /// All providers, in declaration order
    pub const ALL: [Provider; 5] = [
        Provider::Aws,
        Provider::Azure,
        Provider::Gcp,
        Provider::Oracle,
        Provider::Ibm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
            Provider::Oracle => "oracle",
            Provider::Ibm => "ibm",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| FetchError::UnsupportedProvider(s.to_string()))
    }
}

/// Kind of resource a resource id refers to
///
/// Each variant has its own retrieval logic. Ids that do not classify into
/// any kind for their provider cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// AWS EC2 instance (`i-...`)
    Ec2Instance,
}

impl ResourceKind {
    /// Classify a resource id for a provider
    pub fn classify(provider: Provider, resource_id: &str) -> Option<Self> {
        match provider {
            Provider::Aws if resource_id.starts_with("i-") => Some(ResourceKind::Ec2Instance),
            Provider::Aws | Provider::Azure | Provider::Gcp | Provider::Oracle | Provider::Ibm => {
                None
            }
        }
    }
}

/// Build the cache key for a lookup
pub fn cache_key(provider: Provider, resource_id: &str) -> String {
    format!("{}:{}", provider, resource_id)
}
