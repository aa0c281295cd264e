//! Configuration Management
//!
//! Loads cloudscope's configuration: cache and retry tuning, gateway
//! endpoints and per-provider credentials. JSON by default, YAML when the
//! file extension says so.

use crate::cloud::gateway::GatewayConnector;
use crate::cloud::Provider;
use crate::resource::{Credentials, ResourceFetcher, RetryPolicy, TtlCache};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Cache tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl_secs: 300,
        }
    }
}

/// Retry tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub multiplier_secs: u64,
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier_secs: 1,
            min_wait_secs: 4,
            max_wait_secs: 10,
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Inventory gateway base URL per provider
    #[serde(default)]
    pub endpoints: HashMap<Provider, String>,
    /// Credential records per provider
    #[serde(default)]
    pub credentials: Credentials,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cloudscope").join("config.json"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content, path)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            Ok(serde_yaml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }

    pub fn cache(&self) -> TtlCache<serde_json::Value> {
        TtlCache::new(self.cache.max_size, Duration::from_secs(self.cache.ttl_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.multiplier_secs),
            Duration::from_secs(self.retry.min_wait_secs),
            Duration::from_secs(self.retry.max_wait_secs),
        )
    }

    /// Credentials restricted to one provider, or all when `None`
    pub fn credentials_for(&self, provider: Option<Provider>) -> Credentials {
        self.credentials
            .iter()
            .filter(|(p, _)| provider.map_or(true, |wanted| **p == wanted))
            .map(|(p, record)| (*p, record.clone()))
            .collect()
    }

    /// Build a fetcher with a gateway connector for every provider
    ///
    /// Clients are not initialized yet.
    pub fn build_fetcher(&self) -> ResourceFetcher {
        let mut fetcher = ResourceFetcher::new(self.cache(), self.retry_policy());
        for provider in Provider::ALL {
            let endpoint = self.endpoints.get(&provider).map(|s| s.as_str());
            fetcher.register(Arc::new(GatewayConnector::new(provider, endpoint)));
        }
        fetcher
    }
}
