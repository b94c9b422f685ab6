//! Delivery Model
//!
//! One driver-to-client drop-off carrying a split of payment methods.
//! `debt_amount` is new debt taken by the client on this delivery,
//! `extra_payment` is old debt repaid in cash at the door; both are
//! mirrored into the client ledger by the server.

use serde::{Deserialize, Serialize};

/// Delivery record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Delivery {
    pub id: i64,
    pub driver_id: i64,
    pub client_id: i64,
    /// Delivery timestamp (Unix millis)
    pub delivery_date: i64,
    /// Declared total: cash + card + transfer + debt
    pub amount: f64,
    pub cash_amount: f64,
    pub card_amount: f64,
    pub transfer_amount: f64,
    /// New debt incurred by the client
    pub debt_amount: f64,
    /// Value of goods dropped off (informational, outside the split)
    pub goods_amount: f64,
    /// Old debt repaid in cash at delivery time
    pub extra_payment: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Delivery joined with driver and client display names (list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryWithNames {
    pub id: i64,
    pub driver_id: i64,
    pub driver_name: String,
    pub client_id: i64,
    pub client_name: String,
    pub delivery_date: i64,
    pub amount: f64,
    pub cash_amount: f64,
    pub card_amount: f64,
    pub transfer_amount: f64,
    pub debt_amount: f64,
    pub goods_amount: f64,
    pub extra_payment: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create delivery payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryCreate {
    pub driver_id: i64,
    pub client_id: i64,
    /// ISO-8601 timestamp or `YYYY-MM-DD`; defaults to now
    pub delivery_date: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub cash_amount: f64,
    #[serde(default)]
    pub card_amount: f64,
    #[serde(default)]
    pub transfer_amount: f64,
    #[serde(default)]
    pub debt_amount: f64,
    #[serde(default)]
    pub goods_amount: f64,
    #[serde(default)]
    pub extra_payment: f64,
}

/// Update delivery payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeliveryUpdate {
    pub driver_id: Option<i64>,
    pub client_id: Option<i64>,
    pub delivery_date: Option<String>,
    pub amount: Option<f64>,
    pub cash_amount: Option<f64>,
    pub card_amount: Option<f64>,
    pub transfer_amount: Option<f64>,
    pub debt_amount: Option<f64>,
    pub goods_amount: Option<f64>,
    pub extra_payment: Option<f64>,
}
