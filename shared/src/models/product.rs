//! Product Model

use serde::{Deserialize, Serialize};

/// Product record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
}

/// Stock change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLogType {
    Income,
    Outcome,
}

/// Append-only stock change event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductLog {
    pub id: i64,
    pub product_id: i64,
    pub log_type: StockLogType,
    /// Quantity moved (always positive)
    pub value: i64,
    /// Who performed the change
    pub actor: String,
    pub created_at: i64,
}

/// Stock adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub log_type: StockLogType,
    pub value: i64,
    pub actor: Option<String>,
}

/// Stock adjustment response: the updated product and the appended log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdateResult {
    pub product: Product,
    pub log: ProductLog,
}

/// Product detail response (product + its log history)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithLogs {
    #[serde(flatten)]
    pub product: Product,
    pub logs: Vec<ProductLog>,
}
