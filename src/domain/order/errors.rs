use std::time::Duration;

use crate::clients::LookupError;
use crate::store::StoreError;

// ============================================================================
// Order Creation Errors
// ============================================================================
//
// Every variant is terminal for the request; nothing is retried.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order request: {0}")]
    Validation(String),

    #[error("Customer not found: {customer_id}")]
    CustomerNotFound {
        customer_id: String,
        #[source]
        source: LookupError,
    },

    #[error("Product not found: {product_id}")]
    ProductNotFound {
        product_id: String,
        #[source]
        source: LookupError,
    },

    #[error("Timed out after {0:?} waiting for customer and product services")]
    Timeout(Duration),

    #[error("Failed to persist order: {0}")]
    Persistence(#[source] StoreError),
}

impl OrderError {
    /// Short label used for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "validation",
            OrderError::CustomerNotFound { .. } => "customer_not_found",
            OrderError::ProductNotFound { .. } => "product_not_found",
            OrderError::Timeout(_) => "timeout",
            OrderError::Persistence(_) => "persistence",
        }
    }
}
