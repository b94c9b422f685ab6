//! Client Model

use serde::{Deserialize, Serialize};

/// Client record — a delivery customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    /// Unique display name
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create client payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Update client payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}
