//! Client Debt Ledger Model
//!
//! The unified ledger: standalone debt/payment rows entered by hand
//! (`delivery_id` null) and rows mirrored from delivery debt/repayment
//! fields (`delivery_id` set, maintained by the delivery endpoints and
//! read-only here).

use serde::{Deserialize, Serialize};

/// Ledger entry direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    /// Client took on debt
    DebtIncurred,
    /// Client paid debt back
    DebtRepaid,
}

/// Ledger entry record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: i64,
    pub client_id: i64,
    /// Set when the entry mirrors a delivery; such rows are not editable
    pub delivery_id: Option<i64>,
    pub entry_type: LedgerEntryType,
    pub amount: f64,
    /// Event timestamp (Unix millis)
    pub entry_date: i64,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LedgerEntry {
    /// Standalone entries may be edited/deleted; delivery mirrors may not
    pub fn editable(&self) -> bool {
        self.delivery_id.is_none()
    }

    /// Signed contribution to the outstanding balance
    pub fn signed_amount(&self) -> f64 {
        match self.entry_type {
            LedgerEntryType::DebtIncurred => self.amount,
            LedgerEntryType::DebtRepaid => -self.amount,
        }
    }
}

/// Create standalone ledger entry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryCreate {
    pub entry_type: LedgerEntryType,
    pub amount: f64,
    /// ISO-8601 timestamp or `YYYY-MM-DD`; defaults to now
    pub entry_date: Option<String>,
    pub description: Option<String>,
}

/// Update standalone ledger entry payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerEntryUpdate {
    pub amount: Option<f64>,
    pub entry_date: Option<String>,
    pub description: Option<String>,
}

/// Outstanding balance with its split by source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientBalance {
    /// Σ incurred − Σ repaid over the whole ledger
    pub balance: f64,
    /// Portion from hand-entered rows
    pub from_manual: f64,
    /// Portion from delivery-mirrored rows
    pub from_deliveries: f64,
}
