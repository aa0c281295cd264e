//! Provider client boundary
//!
//! The fetch pipeline never speaks a provider's protocol itself. It asks a
//! [`ProviderConnector`] for a client once at startup, then asks that
//! [`ProviderClient`] for resource details.

use super::{Provider, ResourceDetails, ResourceKind};
use crate::resource::CredentialRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Builds clients for one provider
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    fn provider(&self) -> Provider;

    /// Construct a client from an already validated credential record
    async fn connect(&self, credentials: &CredentialRecord) -> Result<Arc<dyn ProviderClient>>;
}

/// An initialized client for one provider
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Classify a resource id into a kind this client can describe
    fn classify(&self, resource_id: &str) -> Option<ResourceKind>;

    /// Retrieve details for a single resource
    async fn describe(&self, kind: ResourceKind, resource_id: &str) -> Result<ResourceDetails>;
}
