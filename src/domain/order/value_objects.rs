use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

/// One requested product/quantity pair, before pricing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineRequest {
    #[serde(alias = "produto_id")]
    pub product_id: String,
    #[serde(alias = "quantidade")]
    pub quantity: i32,
}

/// A priced line; the unit price is a snapshot of the product at creation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
}

impl OrderLine {
    pub fn priced(product_id: impl Into<String>, quantity: i32, unit_price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
            subtotal: unit_price * f64::from(quantity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priced_line_subtotal() {
        let line = OrderLine::priced("p-1", 3, 89.9);

        assert_eq!(line.product_id, "p-1");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.subtotal, 89.9 * 3.0);
    }

    #[test]
    fn test_line_request_accepts_upstream_names() {
        let json = r#"{"produto_id":"p-1","quantidade":2}"#;
        let line: LineRequest = serde_json::from_str(json).unwrap();

        assert_eq!(line.product_id, "p-1");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");

        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, OrderStatus::Completed);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("completed"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("cancelled"), None);
        assert_eq!(OrderStatus::Completed.as_str(), "completed");
    }
}
