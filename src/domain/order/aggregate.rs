use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{LineRequest, OrderLine, OrderStatus};
use crate::clients::{LookupError, Resource};
use crate::models::{Customer, Product};

// ============================================================================
// Order - Priced, immutable sales order
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,

    // Denormalized customer snapshot
    pub customer_id: String,
    pub customer_name: String,

    pub lines: Vec<OrderLine>,
    pub total: f64,

    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Price every requested line with the looked-up product and build the order.
    ///
    /// Lines keep the request order. `products` must contain every requested
    /// product id.
    pub fn assemble(
        customer: &Customer,
        requested: &[LineRequest],
        products: &HashMap<String, Product>,
    ) -> Result<Self, OrderError> {
        let mut lines = Vec::with_capacity(requested.len());
        let mut total = 0.0;

        for request in requested {
            let product = products.get(&request.product_id).ok_or_else(|| OrderError::ProductNotFound {
                product_id: request.product_id.clone(),
                source: LookupError::Malformed {
                    resource: Resource::Product,
                    message: "product missing from lookup results".to_string(),
                },
            })?;

            let line = OrderLine::priced(request.product_id.clone(), request.quantity, product.unit_price);
            total += line.subtotal;
            lines.push(line);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            lines,
            total,
            // Durable stores keep microseconds
            created_at: Utc::now().trunc_subsecs(6),
            status: OrderStatus::Completed,
        })
    }

    /// True when every subtotal and the total match their line data
    pub fn is_consistent(&self) -> bool {
        let mut total = 0.0;
        for line in &self.lines {
            if line.subtotal != line.unit_price * f64::from(line.quantity) {
                return false;
            }
            total += line.subtotal;
        }
        total == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn customer() -> Customer {
        Customer {
            id: "c-1".to_string(),
            name: "João Silva".to_string(),
            phone: "(11) 99999-9999".to_string(),
            created_at: String::new(),
        }
    }

    fn product(id: &str, unit_price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            unit_price,
            created_at: String::new(),
        }
    }

    fn catalog() -> HashMap<String, Product> {
        [product("p-1", 2500.0), product("p-2", 89.9)]
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect()
    }

    #[test]
    fn test_assemble_prices_lines_in_request_order() {
        let requested = vec![
            LineRequest { product_id: "p-2".to_string(), quantity: 3 },
            LineRequest { product_id: "p-1".to_string(), quantity: 1 },
        ];

        let order = Order::assemble(&customer(), &requested, &catalog()).unwrap();

        assert_eq!(order.customer_id, "c-1");
        assert_eq!(order.customer_name, "João Silva");
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].product_id, "p-2");
        assert_eq!(order.lines[0].unit_price, 89.9);
        assert_eq!(order.lines[0].subtotal, 89.9 * 3.0);
        assert_eq!(order.total, 89.9 * 3.0 + 2500.0);
        assert!(order.is_consistent());
    }

    #[test]
    fn test_assemble_missing_product_fails() {
        let requested = vec![LineRequest { product_id: "p-9".to_string(), quantity: 1 }];

        let result = Order::assemble(&customer(), &requested, &catalog());
        assert!(matches!(result, Err(OrderError::ProductNotFound { ref product_id, .. }) if product_id == "p-9"));
    }

    #[test]
    fn test_assemble_generates_unique_ids() {
        let requested = vec![LineRequest { product_id: "p-1".to_string(), quantity: 1 }];

        let first = Order::assemble(&customer(), &requested, &catalog()).unwrap();
        let second = Order::assemble(&customer(), &requested, &catalog()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_created_at_has_microsecond_precision() {
        let requested = vec![LineRequest { product_id: "p-1".to_string(), quantity: 1 }];
        let order = Order::assemble(&customer(), &requested, &catalog()).unwrap();

        assert_eq!(order.created_at.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_inconsistent_total_detected() {
        let requested = vec![LineRequest { product_id: "p-1".to_string(), quantity: 2 }];
        let mut order = Order::assemble(&customer(), &requested, &catalog()).unwrap();

        order.total += 1.0;
        assert!(!order.is_consistent());
    }
}
