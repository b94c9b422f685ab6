//! Driver Day Status Model (司机日结)
//!
//! One reconciliation record per (driver, calendar date): the expected
//! cash, the cash actually handed in, and the banknote count used to
//! justify it. Status is asserted by the operator, never derived.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reconciliation status, chosen by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Pending,
    PaidOff,
    PartiallyPaid,
    Disputed,
}

impl Default for DayStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Banknote count: denomination (as decimal string) → number of notes
pub type BanknoteCount = BTreeMap<String, i64>;

/// Day status record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DriverDayStatus {
    pub id: i64,
    pub driver_id: i64,
    /// Business date (`YYYY-MM-DD`), upsert key together with driver_id
    pub date: String,
    pub status: DayStatus,
    /// Expected cash due, as recorded at save time
    pub total_cash: f64,
    /// Cash counted/declared by the operator
    pub cash_paid: f64,
    pub notes: Option<String>,
    /// Denomination → count justifying `cash_paid`
    #[cfg_attr(feature = "db", sqlx(json))]
    pub banknotes: BanknoteCount,
    /// Bumped on every write; optimistic concurrency token
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert payload, keyed by (driver_id, date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDayStatusUpsert {
    pub driver_id: i64,
    /// Business date (`YYYY-MM-DD`)
    pub date: String,
    pub status: DayStatus,
    #[serde(default)]
    pub total_cash: f64,
    #[serde(default)]
    pub cash_paid: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub banknotes: BanknoteCount,
    /// When present, the write is rejected with a conflict unless it
    /// matches the stored version; when absent, last write wins.
    pub expected_version: Option<i64>,
}

/// Origin of a merged day-status listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatusSource {
    /// Stored `driver_day_status` row
    Manual,
    /// Synthesized from that day's deliveries; read-only
    Delivery,
}

/// Row of the merged day-status listing
///
/// Stored rows keep their numeric id (as a string); synthesized rows use
/// `delivery:{driver_id}:{date}` so the frontend can link back to the day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStatusEntry {
    pub id: String,
    pub driver_id: i64,
    pub driver_name: String,
    pub date: String,
    pub status: DayStatus,
    pub total_cash: f64,
    pub cash_paid: f64,
    pub notes: Option<String>,
    pub source: DayStatusSource,
}

/// Response of the daily cash-total endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCashTotal {
    pub total_cash: f64,
}
