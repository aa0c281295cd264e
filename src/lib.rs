//! cloudscope
//!
//! A lookup layer in front of several cloud providers. Requests for a
//! `(provider, resource id)` pair are checked against the caller's
//! credentials, served from a bounded TTL cache when possible, and otherwise
//! fetched through a provider client wrapped in an exponential-backoff retry.
//!
//! # Module Structure
//!
//! - [`cloud`] - Provider enumeration and the client boundary (traits + HTTP gateway)
//! - [`resource`] - Cache, credential validation, retry policy and the fetcher
//! - [`config`] - Persistent configuration
//! - [`error`] - Error taxonomy shared by the whole crate

pub mod cloud;
pub mod config;
pub mod error;
pub mod resource;

pub use cloud::{Provider, ResourceDetails, ResourceKind};
pub use error::FetchError;
pub use resource::{Credentials, CredentialRecord, ResourceFetcher, RetryPolicy, TtlCache};
