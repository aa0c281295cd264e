//! Resource lookup pipeline
//!
//! Every lookup runs validate → cache lookup → fetch (with retry) → populate.
//!
//! # Architecture
//!
//! - [`cache`] - Bounded, time-limited cache of resource details
//! - [`credentials`] - Required-field validation of credential records
//! - [`retry`] - Exponential backoff retry policy for provider I/O
//! - [`fetcher`] - Orchestrates the above for each lookup
//!
//! # Example
//!
//! ```ignore
//! use cloudscope::{FetchError, Provider, ResourceFetcher};
//!
//! async fn describe(fetcher: &ResourceFetcher) -> Result<serde_json::Value, FetchError> {
//!     fetcher.get_resource_details(Provider::Aws, "i-0123").await
//! }
//! ```

pub mod cache;
pub mod credentials;
pub mod fetcher;
pub mod retry;

pub use cache::TtlCache;
pub use credentials::{required_fields, validate, CredentialRecord, Credentials};
pub use fetcher::ResourceFetcher;
pub use retry::RetryPolicy;
