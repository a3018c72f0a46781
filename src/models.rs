use serde::{Deserialize, Serialize};

// ============================================================================
// Remote Entities
// These are owned by the customer and product services and only read here
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: String,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "telefone")]
    pub phone: String,
    #[serde(default, alias = "data_criacao")]
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: String,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "descricao")]
    pub description: String,
    #[serde(alias = "valor")]
    pub unit_price: f64,
    #[serde(default, alias = "data_criacao")]
    pub created_at: String,
}

impl Product {
    /// Prices must be finite and non-negative to be usable on an order line
    pub fn has_valid_price(&self) -> bool {
        self.unit_price.is_finite() && self.unit_price >= 0.0
    }
}
