//! Driver Expense Repository

use super::{RepoError, RepoResult};
use shared::models::{DriverExpense, DriverExpenseCreate, DriverExpenseUpdate};
use sqlx::SqlitePool;

const EXPENSE_SELECT: &str = "SELECT id, driver_id, expense_type, name, amount, expense_date, created_at, updated_at FROM driver_expense";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DriverExpense>> {
    let sql = format!("{EXPENSE_SELECT} WHERE id = ?");
    let expense = sqlx::query_as::<_, DriverExpense>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(expense)
}

/// List expenses, newest first; both filters optional
pub async fn find_all(
    pool: &SqlitePool,
    driver_id: Option<i64>,
    date_range: Option<(i64, i64)>,
) -> RepoResult<Vec<DriverExpense>> {
    let mut sql = format!("{EXPENSE_SELECT} WHERE 1=1");
    if driver_id.is_some() {
        sql.push_str(" AND driver_id = ?");
    }
    if date_range.is_some() {
        sql.push_str(" AND expense_date >= ? AND expense_date < ?");
    }
    sql.push_str(" ORDER BY expense_date DESC");

    let mut query = sqlx::query_as::<_, DriverExpense>(&sql);
    if let Some(driver_id) = driver_id {
        query = query.bind(driver_id);
    }
    if let Some((start, end)) = date_range {
        query = query.bind(start).bind(end);
    }

    let expenses = query.fetch_all(pool).await?;
    Ok(expenses)
}

/// Expenses of one driver within `[start, end)` (reconciliation input)
pub async fn find_for_driver_day(
    pool: &SqlitePool,
    driver_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<DriverExpense>> {
    find_all(pool, Some(driver_id), Some((start_millis, end_millis))).await
}

pub async fn sum_for_driver_day(
    pool: &SqlitePool,
    driver_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<f64> {
    let total = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(amount), 0.0) FROM driver_expense WHERE driver_id = ? AND expense_date >= ? AND expense_date < ?",
    )
    .bind(driver_id)
    .bind(start_millis)
    .bind(end_millis)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn create(
    pool: &SqlitePool,
    data: &DriverExpenseCreate,
    expense_date: i64,
) -> RepoResult<DriverExpense> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO driver_expense (id, driver_id, expense_type, name, amount, expense_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(data.driver_id)
    .bind(data.expense_type)
    .bind(&data.name)
    .bind(data.amount)
    .bind(expense_date)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create driver expense".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &DriverExpenseUpdate,
    expense_date: Option<i64>,
) -> RepoResult<DriverExpense> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE driver_expense SET driver_id = COALESCE(?1, driver_id), expense_type = COALESCE(?2, expense_type), name = COALESCE(?3, name), amount = COALESCE(?4, amount), expense_date = COALESCE(?5, expense_date), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.driver_id)
    .bind(data.expense_type)
    .bind(&data.name)
    .bind(data.amount)
    .bind(expense_date)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Driver expense {id} not found"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Driver expense {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM driver_expense WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
