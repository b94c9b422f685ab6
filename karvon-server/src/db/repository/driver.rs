//! Driver Repository

use super::{RepoError, RepoResult};
use shared::models::{Driver, DriverCreate, DriverUpdate};
use sqlx::SqlitePool;

const DRIVER_SELECT: &str = "SELECT id, name, phone, created_at, updated_at FROM driver";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Driver>> {
    let sql = format!("{DRIVER_SELECT} ORDER BY name ASC");
    let drivers = sqlx::query_as::<_, Driver>(&sql).fetch_all(pool).await?;
    Ok(drivers)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Driver>> {
    let sql = format!("{DRIVER_SELECT} WHERE id = ?");
    let driver = sqlx::query_as::<_, Driver>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(driver)
}

pub async fn create(pool: &SqlitePool, data: DriverCreate) -> RepoResult<Driver> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO driver (id, name, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create driver".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DriverUpdate) -> RepoResult<Driver> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE driver SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), updated_at = ?3 WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Driver {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Driver {id} not found")))
}

/// Delete a driver and everything that hangs off it, in one transaction:
/// day statuses, expenses, deliveries (ledger mirrors cascade via FK).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM driver WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM driver_day_status WHERE driver_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM driver_expense WHERE driver_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM delivery WHERE driver_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM driver WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
