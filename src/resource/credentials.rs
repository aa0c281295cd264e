//! Credential validation
//!
//! Every provider has a fixed list of credential fields. A lookup against a
//! provider is only attempted when all of them are present.

use crate::cloud::Provider;
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Required credential fields per provider
const REQUIREMENTS: &[(Provider, &[&str])] = &[
    (Provider::Aws, &["access_key", "secret_key", "region"]),
    (
        Provider::Azure,
        &["tenant_id", "client_id", "client_secret", "subscription_id"],
    ),
    (Provider::Gcp, &["project_id", "key_file"]),
    (Provider::Oracle, &["user", "private_key", "tenancy", "region"]),
    (Provider::Ibm, &["api_key"]),
];

/// Get the required credential fields for a provider
pub fn required_fields(provider: Provider) -> Option<&'static [&'static str]> {
    REQUIREMENTS
        .iter()
        .find(|(p, _)| *p == provider)
        .map(|(_, fields)| *fields)
}

/// Credential fields for a single provider
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRecord(BTreeMap<String, String>);

impl CredentialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.0.insert(field.to_string(), value.to_string());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CredentialRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// Security: field names only, never values
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fields()).finish()
    }
}

/// Credential records for all configured providers
pub type Credentials = HashMap<Provider, CredentialRecord>;

/// Check that `credentials` holds every field `provider` requires
///
/// Only the presence of a field is checked; empty values are accepted.
/// Returns the record that passed.
pub fn validate(
    provider: Provider,
    credentials: &Credentials,
) -> Result<&CredentialRecord, FetchError> {
    let Some(required) = required_fields(provider) else {
        return Err(FetchError::UnsupportedProvider(provider.to_string()));
    };

    let Some(record) = credentials.get(&provider) else {
        return Err(FetchError::MissingFields {
            provider,
            fields: required.iter().map(|field| field.to_string()).collect(),
        });
    };

    let missing: Vec<String> = required
        .iter()
        .filter(|field| !record.contains(field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(FetchError::MissingFields {
            provider,
            fields: missing,
        });
    }

    Ok(record)
}
