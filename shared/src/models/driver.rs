//! Driver Model

use serde::{Deserialize, Serialize};

/// Driver record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create driver payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCreate {
    pub name: String,
    pub phone: Option<String>,
}

/// Update driver payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}
