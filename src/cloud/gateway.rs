//! Inventory gateway client
//!
//! Talks JSON over HTTP to one gateway endpoint per provider. The gateway
//! answers lookups in the shape of the provider's own describe APIs.

use super::client::{ProviderClient, ProviderConnector};
use super::http::GatewayHttpClient;
use super::{Provider, ResourceDetails, ResourceKind};
use crate::resource::CredentialRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Connector for a provider served by an inventory gateway
pub struct GatewayConnector {
    provider: Provider,
    endpoint: Option<String>,
}

impl GatewayConnector {
    pub fn new(provider: Provider, endpoint: Option<&str>) -> Self {
        Self {
            provider,
            endpoint: endpoint.map(|s| s.to_string()),
        }
    }
}

#[async_trait]
impl ProviderConnector for GatewayConnector {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn connect(&self, credentials: &CredentialRecord) -> Result<Arc<dyn ProviderClient>> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(anyhow::anyhow!(
                "No gateway endpoint configured for {}",
                self.provider
            ));
        };

        let base = parse_base_url(endpoint)?;
        let http = GatewayHttpClient::new()?;

        tracing::debug!("Gateway client for {} -> {}", self.provider, base);

        Ok(Arc::new(GatewayClient {
            provider: self.provider,
            base,
            http,
            credentials: credentials.clone(),
        }))
    }
}

/// Parse an endpoint so that relative joins append to its path
fn parse_base_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .with_context(|| format!("Invalid gateway endpoint: {}", endpoint))?;

    if url.cannot_be_a_base() {
        return Err(anyhow::anyhow!("Invalid gateway endpoint: {}", endpoint));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Initialized gateway client
pub struct GatewayClient {
    provider: Provider,
    base: Url,
    http: GatewayHttpClient,
    credentials: CredentialRecord,
}

impl GatewayClient {
    fn field(&self, name: &str) -> Result<&str> {
        self.credentials
            .get(name)
            .ok_or_else(|| {
                anyhow::anyhow!("Credential field {} not set for {}", name, self.provider)
            })
    }

    async fn describe_ec2_instance(&self, instance_id: &str) -> Result<ResourceDetails> {
        let url = self
            .base
            .join(&format!("ec2/instances/{}", urlencoding::encode(instance_id)))
            .context("Failed to build instance URL")?;

        let response = self
            .http
            .get(
                url,
                self.field("access_key")?,
                self.field("secret_key")?,
                &[("region", self.field("region")?)],
            )
            .await?;

        extract_instance(response)
            .ok_or_else(|| anyhow::anyhow!("Instance {} not found in response", instance_id))
    }
}

#[async_trait]
impl ProviderClient for GatewayClient {
    fn classify(&self, resource_id: &str) -> Option<ResourceKind> {
        ResourceKind::classify(self.provider, resource_id)
    }

    async fn describe(&self, kind: ResourceKind, resource_id: &str) -> Result<ResourceDetails> {
        tracing::debug!(
            "describe: provider={}, kind={:?}, resource={}",
            self.provider,
            kind,
            resource_id
        );

        match kind {
            ResourceKind::Ec2Instance => self.describe_ec2_instance(resource_id).await,
        }
    }
}

/// Pull the first instance out of a DescribeInstances-shaped response
fn extract_instance(mut response: Value) -> Option<Value> {
    let instance = response
        .get_mut("Reservations")?
        .get_mut(0)?
        .get_mut("Instances")?
        .get_mut(0)?;
    Some(instance.take())
}
