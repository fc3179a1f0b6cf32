use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One catalog row (inventory_item). Replaced wholesale on each upload.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct InventoryItem {
    pub sku: Option<String>,
    pub name: String,
    /// Comma/space separated alternate names, tokenized together with `name`
    pub synonyms: Option<String>,
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub restock_days: Option<i64>,
    pub supplier: Option<String>,
}

impl InventoryItem {
    /// Absent stock is treated as zero.
    pub fn stock_or_zero(&self) -> i64 {
        self.stock.unwrap_or(0).max(0)
    }
}

/// External provider offer for sourcing shortfalls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOffer {
    pub name: String,
    pub unit_cost: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub supplier: Option<String>,
}
