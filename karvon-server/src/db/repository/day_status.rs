//! Driver Day Status Repository
//!
//! One row per (driver, business date), written through an upsert. The
//! `version` column is the optimistic-concurrency token: it bumps on
//! every write, and a caller-supplied `expected_version` is checked
//! inside the same transaction as the write.

use super::{RepoError, RepoResult};
use shared::models::{DriverDayStatus, DriverDayStatusUpsert};
use sqlx::SqlitePool;

const STATUS_SELECT: &str = "SELECT id, driver_id, date, status, total_cash, cash_paid, notes, banknotes, version, created_at, updated_at FROM driver_day_status";

/// Day status joined with the driver's display name (merged listing input)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayStatusWithDriver {
    pub id: i64,
    pub driver_id: i64,
    pub driver_name: String,
    pub date: String,
    pub status: shared::models::DayStatus,
    pub total_cash: f64,
    pub cash_paid: f64,
    pub notes: Option<String>,
}

pub async fn find_by_driver_date(
    pool: &SqlitePool,
    driver_id: i64,
    date: &str,
) -> RepoResult<Option<DriverDayStatus>> {
    let sql = format!("{STATUS_SELECT} WHERE driver_id = ? AND date = ?");
    let status = sqlx::query_as::<_, DriverDayStatus>(&sql)
        .bind(driver_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(status)
}

/// Stored rows in a date range (inclusive, lexical on `YYYY-MM-DD`),
/// newest first, with driver names
pub async fn find_in_range(
    pool: &SqlitePool,
    start_date: Option<&str>,
    end_date: Option<&str>,
    driver_id: Option<i64>,
) -> RepoResult<Vec<DayStatusWithDriver>> {
    let mut sql = String::from(
        "SELECT s.id, s.driver_id, d.name AS driver_name, s.date, s.status, s.total_cash, s.cash_paid, s.notes FROM driver_day_status s JOIN driver d ON s.driver_id = d.id WHERE 1=1",
    );
    if start_date.is_some() {
        sql.push_str(" AND s.date >= ?");
    }
    if end_date.is_some() {
        sql.push_str(" AND s.date <= ?");
    }
    if driver_id.is_some() {
        sql.push_str(" AND s.driver_id = ?");
    }
    sql.push_str(" ORDER BY s.date DESC");

    let mut query = sqlx::query_as::<_, DayStatusWithDriver>(&sql);
    if let Some(start) = start_date {
        query = query.bind(start.to_string());
    }
    if let Some(end) = end_date {
        query = query.bind(end.to_string());
    }
    if let Some(driver_id) = driver_id {
        query = query.bind(driver_id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Upsert keyed by (driver_id, date); all value fields are overwritten.
///
/// When `expected_version` is set and does not match the stored row the
/// write is rejected with `Duplicate` (surfaces as HTTP 409). A missing
/// row counts as version 0.
pub async fn upsert(
    pool: &SqlitePool,
    data: &DriverDayStatusUpsert,
) -> RepoResult<DriverDayStatus> {
    let banknotes_json = serde_json::to_string(&data.banknotes)?;
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let current_version = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM driver_day_status WHERE driver_id = ? AND date = ?",
    )
    .bind(data.driver_id)
    .bind(&data.date)
    .fetch_optional(&mut *tx)
    .await?
    .unwrap_or(0);

    if let Some(expected) = data.expected_version
        && expected != current_version
    {
        return Err(RepoError::Duplicate(format!(
            "Day status for driver {} on {} was modified concurrently (version {current_version}, expected {expected})",
            data.driver_id, data.date
        )));
    }

    sqlx::query(
        "INSERT INTO driver_day_status (id, driver_id, date, status, total_cash, cash_paid, notes, banknotes, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9) ON CONFLICT (driver_id, date) DO UPDATE SET status = excluded.status, total_cash = excluded.total_cash, cash_paid = excluded.cash_paid, notes = excluded.notes, banknotes = excluded.banknotes, version = driver_day_status.version + 1, updated_at = excluded.updated_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(data.driver_id)
    .bind(&data.date)
    .bind(data.status)
    .bind(data.total_cash)
    .bind(data.cash_paid)
    .bind(&data.notes)
    .bind(&banknotes_json)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_driver_date(pool, data.driver_id, &data.date)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert day status".into()))
}

pub async fn delete(pool: &SqlitePool, driver_id: i64, date: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM driver_day_status WHERE driver_id = ? AND date = ?")
        .bind(driver_id)
        .bind(date)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Σ cash_paid over stored rows of one business date
pub async fn sum_cash_paid(pool: &SqlitePool, date: &str) -> RepoResult<f64> {
    let total = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(cash_paid), 0.0) FROM driver_day_status WHERE date = ?",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(total)
}
