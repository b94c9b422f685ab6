//! Driver Daily Report Model (日报)

use serde::{Deserialize, Serialize};

use super::{DeliveryWithNames, Driver, DriverDayStatus, DriverExpense};

/// Computed totals for one driver on one business day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub total_cash: f64,
    pub total_card: f64,
    pub total_transfer: f64,
    pub total_debt: f64,
    pub total_goods: f64,
    pub total_extra_payment: f64,
    pub total_expenses: f64,
    /// Σ cash + Σ extra_payment − Σ expenses: what the driver owes the till
    pub net_cash_due: f64,
    /// Σ denomination × count over the saved banknotes
    pub counted_total: f64,
    /// net_cash_due − counted_total (positive: driver short)
    pub difference: f64,
    pub balanced: bool,
}

/// Daily reconciliation report for one driver and date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDayReport {
    pub driver: Driver,
    /// Business date (`YYYY-MM-DD`)
    pub date: String,
    pub deliveries: Vec<DeliveryWithNames>,
    pub expenses: Vec<DriverExpense>,
    pub day_status: Option<DriverDayStatus>,
    pub summary: DaySummary,
}
