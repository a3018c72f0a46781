// ============================================================================
// Remote Lookup Clients
// ============================================================================
//
// Read-only access to the customer and product services. The order
// validator only depends on the `RemoteLookup` trait so the transport can
// be swapped (HTTP in production, in-process fakes in tests).
//
// ============================================================================

mod http;

use async_trait::async_trait;
use std::fmt;

use crate::models::{Customer, Product};

pub use http::HttpLookupClient;

/// Which remote service a lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customer,
    Product,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Customer => "customer",
            Resource::Product => "product",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("{resource} {id} not found (status {status})")]
    NotFound {
        resource: Resource,
        id: String,
        status: u16,
    },

    #[error("Failed to reach {resource} service: {message}")]
    Transport { resource: Resource, message: String },

    #[error("Malformed {resource} response: {message}")]
    Malformed { resource: Resource, message: String },

    #[error("{resource} lookup task aborted: {message}")]
    Aborted { resource: Resource, message: String },
}

impl LookupError {
    /// True when the remote service could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, LookupError::Transport { .. })
    }

    /// Short label used for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            LookupError::NotFound { .. } => "not_found",
            LookupError::Transport { .. } => "transport",
            LookupError::Malformed { .. } => "malformed",
            LookupError::Aborted { .. } => "aborted",
        }
    }
}

/// Blocking-per-call access to the customer and product services.
///
/// Implementations perform exactly one outbound request per call: no
/// retries and no caching.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    async fn fetch_customer(&self, id: &str) -> Result<Customer, LookupError>;

    async fn fetch_product(&self, id: &str) -> Result<Product, LookupError>;
}
