//! Resource Fetcher
//!
//! Validates credentials, serves cached details when possible, and otherwise
//! fetches from the provider's client through the retry policy.

use super::cache::TtlCache;
use super::credentials::{self, Credentials};
use super::retry::RetryPolicy;
use crate::cloud::{cache_key, Provider, ProviderClient, ProviderConnector, ResourceDetails};
use crate::error::FetchError;
use std::collections::HashMap;
use std::sync::Arc;

/// Cached, retrying resource lookups across providers
pub struct ResourceFetcher {
    connectors: HashMap<Provider, Arc<dyn ProviderConnector>>,
    credentials: Credentials,
    clients: HashMap<Provider, Arc<dyn ProviderClient>>,
    cache: TtlCache<ResourceDetails>,
    retry: RetryPolicy,
}

impl ResourceFetcher {
    pub fn new(cache: TtlCache<ResourceDetails>, retry: RetryPolicy) -> Self {
        Self {
            connectors: HashMap::new(),
            credentials: Credentials::new(),
            clients: HashMap::new(),
            cache,
            retry,
        }
    }

    /// Register the connector used to build a provider's client
    pub fn register(&mut self, connector: Arc<dyn ProviderConnector>) {
        self.connectors.insert(connector.provider(), connector);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_connector(mut self, connector: Arc<dyn ProviderConnector>) -> Self {
        self.register(connector);
        self
    }

    /// Providers that have an initialized client
    pub fn initialized_providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.clients.keys().copied().collect();
        providers.sort();
        providers
    }

    pub fn cache(&self) -> &TtlCache<ResourceDetails> {
        &self.cache
    }

    /// Validate credentials and build a client for every configured provider
    ///
    /// Providers are processed in declaration order; the first failure aborts
    /// initialization.
    pub async fn initialize_clients(&mut self, credentials: Credentials) -> Result<(), FetchError> {
        self.credentials = credentials;
        self.clients.clear();

        let mut providers: Vec<Provider> = self.credentials.keys().copied().collect();
        providers.sort();

        for provider in providers {
            if let Err(e) = self.initialize_client(provider).await {
                tracing::error!("Error initializing client for {}: {}", provider, e);
                return Err(e);
            }
            tracing::info!("Client initialized for {}", provider);
        }

        Ok(())
    }

    async fn initialize_client(&mut self, provider: Provider) -> Result<(), FetchError> {
        let record = credentials::validate(provider, &self.credentials)?;

        let Some(connector) = self.connectors.get(&provider).cloned() else {
            return Err(FetchError::UnsupportedOperation {
                provider,
                resource_id: String::new(),
            });
        };

        let label = format!("connect {}", provider);
        let client = self
            .retry
            .execute(&label, || connector.connect(record))
            .await
            .map_err(|source| FetchError::ClientInit { provider, source })?;

        self.clients.insert(provider, client);
        Ok(())
    }

    /// Get details for a resource, from cache when fresh
    pub async fn get_resource_details(
        &self,
        provider: Provider,
        resource_id: &str,
    ) -> Result<ResourceDetails, FetchError> {
        credentials::validate(provider, &self.credentials)?;

        let key = cache_key(provider, resource_id);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }
        tracing::debug!("Cache miss: {}", key);

        let details = self.fetch_resource_details(provider, resource_id).await?;
        self.cache.set(key, details.clone());

        Ok(details)
    }

    async fn fetch_resource_details(
        &self,
        provider: Provider,
        resource_id: &str,
    ) -> Result<ResourceDetails, FetchError> {
        let Some(client) = self.clients.get(&provider) else {
            return Err(FetchError::ClientNotInitialized(provider));
        };

        let Some(kind) = client.classify(resource_id) else {
            tracing::error!("Fetch logic for {} is not implemented for {}", provider, resource_id);
            return Err(FetchError::UnsupportedOperation {
                provider,
                resource_id: resource_id.to_string(),
            });
        };

        let label = format!("describe {}:{}", provider, resource_id);
        self.retry
            .execute(&label, || client.describe(kind, resource_id))
            .await
            .map_err(|source| {
                tracing::error!(
                    "Error fetching resource details for {} from {}: {:#}",
                    resource_id,
                    provider,
                    source
                );
                FetchError::Fetch {
                    provider,
                    resource_id: resource_id.to_string(),
                    source,
                }
            })
    }

    /// Whether a resource can be fetched; failures are logged, not returned
    pub async fn resource_exists(&self, provider: Provider, resource_id: &str) -> bool {
        match self.get_resource_details(provider, resource_id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    "Resource {} not found in provider {}: {}",
                    resource_id,
                    provider,
                    e
                );
                false
            }
        }
    }
}

impl Default for ResourceFetcher {
    fn default() -> Self {
        Self::new(TtlCache::default(), RetryPolicy::default())
    }
}
