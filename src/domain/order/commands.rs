use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::LineRequest;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    #[serde(alias = "cliente_id")]
    pub customer_id: String,
    #[serde(alias = "itens", alias = "items")]
    pub lines: Vec<LineRequest>,
}

impl CreateOrder {
    /// Reject payloads that can never produce an order
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.customer_id.trim().is_empty() {
            return Err(OrderError::Validation("customer_id is required".to_string()));
        }

        if self.lines.is_empty() {
            return Err(OrderError::Validation("order must contain at least one line".to_string()));
        }

        for line in &self.lines {
            if line.product_id.trim().is_empty() {
                return Err(OrderError::Validation("product_id is required".to_string()));
            }
            if line.quantity <= 0 {
                return Err(OrderError::Validation(format!(
                    "invalid quantity {} for product {}",
                    line.quantity, line.product_id
                )));
            }
        }

        Ok(())
    }
}
