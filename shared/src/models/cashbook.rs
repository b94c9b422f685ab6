//! Cashbook Model
//!
//! Free-standing daily income/expense entries, unrelated to drivers or
//! clients, plus the business-wide daily summary.

use serde::{Deserialize, Serialize};

/// Cashbook entry (one row of `daily_income` or `daily_expense`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CashEntry {
    pub id: i64,
    pub amount: f64,
    pub description: String,
    /// Event timestamp (Unix millis)
    pub entry_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create cashbook entry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashEntryCreate {
    pub amount: f64,
    pub description: String,
    /// ISO-8601 timestamp or `YYYY-MM-DD`; defaults to now
    pub entry_date: Option<String>,
}

/// Update cashbook entry payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CashEntryUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub entry_date: Option<String>,
}

/// Origin of a summary transaction row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashTransactionKind {
    /// Cash handed in by a driver (from a day-status row); read-only,
    /// links back to the driver/day view
    DriverDay,
    Income,
    Expense,
}

/// Row of the flattened summary transaction list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransaction {
    /// Real id for income/expense rows, `driver:{driver_id}:{date}` for
    /// driver-day rows
    pub id: String,
    pub kind: CashTransactionKind,
    pub amount: f64,
    pub description: String,
    pub entry_date: i64,
    pub editable: bool,
    /// Set on DRIVER_DAY rows
    pub driver_id: Option<i64>,
    /// Business date of DRIVER_DAY rows (`YYYY-MM-DD`)
    pub date: Option<String>,
}

/// Business-wide cash position over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbookSummary {
    /// Σ day-status cash_paid in range
    pub total_driver_cash: f64,
    pub total_income: f64,
    pub total_expense: f64,
    /// driver cash + income − expense
    pub total_balance: f64,
    /// Merged, date-descending
    pub transactions: Vec<CashTransaction>,
}
