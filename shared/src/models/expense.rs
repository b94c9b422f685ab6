//! Driver Expense Model

use serde::{Deserialize, Serialize};

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    Fuel,
    Advance,
    Service,
    Hostel,
    Other,
}

/// Driver expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DriverExpense {
    pub id: i64,
    pub driver_id: i64,
    pub expense_type: ExpenseType,
    /// Free-text label, used only when expense_type = OTHER
    pub name: Option<String>,
    pub amount: f64,
    /// Expense timestamp (Unix millis)
    pub expense_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverExpenseCreate {
    pub driver_id: i64,
    pub expense_type: ExpenseType,
    pub name: Option<String>,
    pub amount: f64,
    /// ISO-8601 timestamp or `YYYY-MM-DD`; defaults to now
    pub expense_date: Option<String>,
}

/// Update expense payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DriverExpenseUpdate {
    pub driver_id: Option<i64>,
    pub expense_type: Option<ExpenseType>,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub expense_date: Option<String>,
}
