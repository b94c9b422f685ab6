//! Cashbook Repository
//!
//! `daily_income` and `daily_expense` share one row shape; every function
//! takes the [`CashTable`] it operates on.

use super::{RepoError, RepoResult};
use shared::models::{CashEntry, CashEntryCreate, CashEntryUpdate};
use sqlx::SqlitePool;

/// Which cashbook table to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashTable {
    Income,
    Expense,
}

impl CashTable {
    fn name(self) -> &'static str {
        match self {
            CashTable::Income => "daily_income",
            CashTable::Expense => "daily_expense",
        }
    }

    fn label(self) -> &'static str {
        match self {
            CashTable::Income => "Daily income",
            CashTable::Expense => "Daily expense",
        }
    }
}

fn select_sql(table: CashTable) -> String {
    format!(
        "SELECT id, amount, description, entry_date, created_at, updated_at FROM {}",
        table.name()
    )
}

pub async fn find_by_id(
    pool: &SqlitePool,
    table: CashTable,
    id: i64,
) -> RepoResult<Option<CashEntry>> {
    let sql = format!("{} WHERE id = ?", select_sql(table));
    let entry = sqlx::query_as::<_, CashEntry>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// Entries within optional `[start, end)` millis range, newest first
pub async fn find_all(
    pool: &SqlitePool,
    table: CashTable,
    date_range: Option<(i64, i64)>,
) -> RepoResult<Vec<CashEntry>> {
    let mut sql = format!("{} WHERE 1=1", select_sql(table));
    if date_range.is_some() {
        sql.push_str(" AND entry_date >= ? AND entry_date < ?");
    }
    sql.push_str(" ORDER BY entry_date DESC");

    let mut query = sqlx::query_as::<_, CashEntry>(&sql);
    if let Some((start, end)) = date_range {
        query = query.bind(start).bind(end);
    }

    let entries = query.fetch_all(pool).await?;
    Ok(entries)
}

pub async fn sum_in_range(
    pool: &SqlitePool,
    table: CashTable,
    date_range: Option<(i64, i64)>,
) -> RepoResult<f64> {
    let mut sql = format!(
        "SELECT COALESCE(SUM(amount), 0.0) FROM {} WHERE 1=1",
        table.name()
    );
    if date_range.is_some() {
        sql.push_str(" AND entry_date >= ? AND entry_date < ?");
    }

    let mut query = sqlx::query_scalar::<_, f64>(&sql);
    if let Some((start, end)) = date_range {
        query = query.bind(start).bind(end);
    }

    let total = query.fetch_one(pool).await?;
    Ok(total)
}

pub async fn create(
    pool: &SqlitePool,
    table: CashTable,
    data: &CashEntryCreate,
    entry_date: i64,
) -> RepoResult<CashEntry> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO {} (id, amount, description, entry_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        table.name()
    );
    sqlx::query(&sql)
        .bind(id)
        .bind(data.amount)
        .bind(&data.description)
        .bind(entry_date)
        .bind(now)
        .execute(pool)
        .await?;

    find_by_id(pool, table, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to create {}", table.label())))
}

pub async fn update(
    pool: &SqlitePool,
    table: CashTable,
    id: i64,
    data: &CashEntryUpdate,
    entry_date: Option<i64>,
) -> RepoResult<CashEntry> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE {} SET amount = COALESCE(?1, amount), description = COALESCE(?2, description), entry_date = COALESCE(?3, entry_date), updated_at = ?4 WHERE id = ?5",
        table.name()
    );
    let rows = sqlx::query(&sql)
        .bind(data.amount)
        .bind(&data.description)
        .bind(entry_date)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "{} {id} not found",
            table.label()
        )));
    }
    find_by_id(pool, table, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("{} {id} not found", table.label())))
}

pub async fn delete(pool: &SqlitePool, table: CashTable, id: i64) -> RepoResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
    let rows = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(rows.rows_affected() > 0)
}
