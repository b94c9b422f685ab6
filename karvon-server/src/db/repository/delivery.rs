//! Delivery Repository
//!
//! Delivery writes also maintain the client ledger mirrors for
//! `debt_amount` / `extra_payment` in the same transaction, so the
//! unified ledger can never drift from the delivery table.

use super::{RepoError, RepoResult};
use shared::models::{Delivery, DeliveryCreate, DeliveryUpdate, DeliveryWithNames};
use sqlx::{SqliteConnection, SqlitePool};

const DELIVERY_SELECT: &str = "SELECT id, driver_id, client_id, delivery_date, amount, cash_amount, card_amount, transfer_amount, debt_amount, goods_amount, extra_payment, created_at, updated_at FROM delivery";

const DELIVERY_WITH_NAMES_SELECT: &str = "SELECT d.id, d.driver_id, dr.name AS driver_name, d.client_id, c.name AS client_name, d.delivery_date, d.amount, d.cash_amount, d.card_amount, d.transfer_amount, d.debt_amount, d.goods_amount, d.extra_payment, d.created_at, d.updated_at FROM delivery d JOIN driver dr ON d.driver_id = dr.id JOIN client c ON d.client_id = c.id";

/// Optional filters for delivery listings
#[derive(Debug, Default, Clone, Copy)]
pub struct DeliveryFilter {
    /// Half-open `[start, end)` millis range
    pub date_range: Option<(i64, i64)>,
    pub driver_id: Option<i64>,
    pub client_id: Option<i64>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Delivery>> {
    let sql = format!("{DELIVERY_SELECT} WHERE id = ?");
    let delivery = sqlx::query_as::<_, Delivery>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(delivery)
}

pub async fn find_with_names_by_id(
    pool: &SqlitePool,
    id: i64,
) -> RepoResult<Option<DeliveryWithNames>> {
    let sql = format!("{DELIVERY_WITH_NAMES_SELECT} WHERE d.id = ?");
    let delivery = sqlx::query_as::<_, DeliveryWithNames>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(delivery)
}

pub async fn find_all(
    pool: &SqlitePool,
    filter: DeliveryFilter,
) -> RepoResult<Vec<DeliveryWithNames>> {
    let mut sql = format!("{DELIVERY_WITH_NAMES_SELECT} WHERE 1=1");
    if filter.date_range.is_some() {
        sql.push_str(" AND d.delivery_date >= ? AND d.delivery_date < ?");
    }
    if filter.driver_id.is_some() {
        sql.push_str(" AND d.driver_id = ?");
    }
    if filter.client_id.is_some() {
        sql.push_str(" AND d.client_id = ?");
    }
    sql.push_str(" ORDER BY d.delivery_date DESC");

    let mut query = sqlx::query_as::<_, DeliveryWithNames>(&sql);
    if let Some((start, end)) = filter.date_range {
        query = query.bind(start).bind(end);
    }
    if let Some(driver_id) = filter.driver_id {
        query = query.bind(driver_id);
    }
    if let Some(client_id) = filter.client_id {
        query = query.bind(client_id);
    }

    let deliveries = query.fetch_all(pool).await?;
    Ok(deliveries)
}

/// Deliveries of one driver within `[start, end)`, oldest first (report order)
pub async fn find_for_driver_day(
    pool: &SqlitePool,
    driver_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<DeliveryWithNames>> {
    let sql = format!(
        "{DELIVERY_WITH_NAMES_SELECT} WHERE d.driver_id = ? AND d.delivery_date >= ? AND d.delivery_date < ? ORDER BY d.delivery_date ASC"
    );
    let deliveries = sqlx::query_as::<_, DeliveryWithNames>(&sql)
        .bind(driver_id)
        .bind(start_millis)
        .bind(end_millis)
        .fetch_all(pool)
        .await?;
    Ok(deliveries)
}

/// Σ cash_amount over a driver's day
pub async fn sum_cash_for_driver_day(
    pool: &SqlitePool,
    driver_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<f64> {
    let total = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(cash_amount), 0.0) FROM delivery WHERE driver_id = ? AND delivery_date >= ? AND delivery_date < ?",
    )
    .bind(driver_id)
    .bind(start_millis)
    .bind(end_millis)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Rewrite the ledger mirrors of one delivery from its current row values.
/// Runs inside the caller's transaction.
async fn sync_ledger_mirrors(
    conn: &mut SqliteConnection,
    delivery_id: i64,
) -> RepoResult<()> {
    let delivery = sqlx::query_as::<_, Delivery>(&format!("{DELIVERY_SELECT} WHERE id = ?"))
        .bind(delivery_id)
        .fetch_one(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM client_ledger WHERE delivery_id = ?")
        .bind(delivery_id)
        .execute(&mut *conn)
        .await?;

    let now = shared::util::now_millis();
    if delivery.debt_amount > 0.0 {
        sqlx::query(
            "INSERT INTO client_ledger (id, client_id, delivery_id, entry_type, amount, entry_date, description, created_at, updated_at) VALUES (?1, ?2, ?3, 'DEBT_INCURRED', ?4, ?5, 'Debt from delivery', ?6, ?6)",
        )
        .bind(shared::util::snowflake_id())
        .bind(delivery.client_id)
        .bind(delivery_id)
        .bind(delivery.debt_amount)
        .bind(delivery.delivery_date)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    if delivery.extra_payment > 0.0 {
        sqlx::query(
            "INSERT INTO client_ledger (id, client_id, delivery_id, entry_type, amount, entry_date, description, created_at, updated_at) VALUES (?1, ?2, ?3, 'DEBT_REPAID', ?4, ?5, 'Payment at delivery', ?6, ?6)",
        )
        .bind(shared::util::snowflake_id())
        .bind(delivery.client_id)
        .bind(delivery_id)
        .bind(delivery.extra_payment)
        .bind(delivery.delivery_date)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Create a delivery and its ledger mirrors in one transaction.
/// `delivery_date` arrives pre-parsed as Unix millis.
pub async fn create(
    pool: &SqlitePool,
    data: &DeliveryCreate,
    delivery_date: i64,
) -> RepoResult<Delivery> {
    let mut tx = pool.begin().await?;

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO delivery (id, driver_id, client_id, delivery_date, amount, cash_amount, card_amount, transfer_amount, debt_amount, goods_amount, extra_payment, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.driver_id)
    .bind(data.client_id)
    .bind(delivery_date)
    .bind(data.amount)
    .bind(data.cash_amount)
    .bind(data.card_amount)
    .bind(data.transfer_amount)
    .bind(data.debt_amount)
    .bind(data.goods_amount)
    .bind(data.extra_payment)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sync_ledger_mirrors(&mut *tx, id).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery".into()))
}

/// Partial update; ledger mirrors are rewritten from the new values in the
/// same transaction. `delivery_date` is the pre-parsed new timestamp, if any.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &DeliveryUpdate,
    delivery_date: Option<i64>,
) -> RepoResult<Delivery> {
    let mut tx = pool.begin().await?;

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE delivery SET driver_id = COALESCE(?1, driver_id), client_id = COALESCE(?2, client_id), delivery_date = COALESCE(?3, delivery_date), amount = COALESCE(?4, amount), cash_amount = COALESCE(?5, cash_amount), card_amount = COALESCE(?6, card_amount), transfer_amount = COALESCE(?7, transfer_amount), debt_amount = COALESCE(?8, debt_amount), goods_amount = COALESCE(?9, goods_amount), extra_payment = COALESCE(?10, extra_payment), updated_at = ?11 WHERE id = ?12",
    )
    .bind(data.driver_id)
    .bind(data.client_id)
    .bind(delivery_date)
    .bind(data.amount)
    .bind(data.cash_amount)
    .bind(data.card_amount)
    .bind(data.transfer_amount)
    .bind(data.debt_amount)
    .bind(data.goods_amount)
    .bind(data.extra_payment)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Delivery {id} not found")));
    }

    sync_ledger_mirrors(&mut *tx, id).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Delivery {id} not found")))
}

/// Delete a delivery; when it was the last one of that (driver, day), the
/// day's status row and expenses go with it, all in one transaction.
/// `day_start`/`day_end` bound the delivery's business day, `date` is its
/// `YYYY-MM-DD` form (computed by the caller in the business timezone).
pub async fn delete_with_day_cleanup(
    pool: &SqlitePool,
    id: i64,
    driver_id: i64,
    day_start: i64,
    day_end: i64,
    date: &str,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    // Ledger mirrors cascade via FK
    let rows = sqlx::query("DELETE FROM delivery WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Ok(false);
    }

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM delivery WHERE driver_id = ? AND delivery_date >= ? AND delivery_date < ?",
    )
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_one(&mut *tx)
    .await?;

    if remaining == 0 {
        sqlx::query("DELETE FROM driver_day_status WHERE driver_id = ? AND date = ?")
            .bind(driver_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "DELETE FROM driver_expense WHERE driver_id = ? AND expense_date >= ? AND expense_date < ?",
        )
        .bind(driver_id)
        .bind(day_start)
        .bind(day_end)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Move a whole driver-day (deliveries + expenses + status row) to another
/// driver, atomically.
pub async fn reassign_day(
    pool: &SqlitePool,
    driver_id: i64,
    target_driver_id: i64,
    day_start: i64,
    day_end: i64,
    date: &str,
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();

    let moved = sqlx::query(
        "UPDATE delivery SET driver_id = ?1, updated_at = ?2 WHERE driver_id = ?3 AND delivery_date >= ?4 AND delivery_date < ?5",
    )
    .bind(target_driver_id)
    .bind(now)
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(
        "UPDATE driver_expense SET driver_id = ?1, updated_at = ?2 WHERE driver_id = ?3 AND expense_date >= ?4 AND expense_date < ?5",
    )
    .bind(target_driver_id)
    .bind(now)
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .execute(&mut *tx)
    .await?;

    // Move the day status: drop any stale row on the target, retarget the
    // source row (keeps status/banknotes/notes intact)
    sqlx::query("DELETE FROM driver_day_status WHERE driver_id = ? AND date = ?")
        .bind(target_driver_id)
        .bind(date)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "UPDATE driver_day_status SET driver_id = ?1, version = version + 1, updated_at = ?2 WHERE driver_id = ?3 AND date = ?4",
    )
    .bind(target_driver_id)
    .bind(now)
    .bind(driver_id)
    .bind(date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(moved)
}

/// Re-date a driver-day's deliveries to `new_date_millis`, atomically.
pub async fn change_day_date(
    pool: &SqlitePool,
    driver_id: i64,
    day_start: i64,
    day_end: i64,
    new_date_millis: i64,
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();

    let moved = sqlx::query(
        "UPDATE delivery SET delivery_date = ?1, updated_at = ?2 WHERE driver_id = ?3 AND delivery_date >= ?4 AND delivery_date < ?5",
    )
    .bind(new_date_millis)
    .bind(now)
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    // Ledger mirrors carry the delivery date; keep them aligned
    sqlx::query(
        "UPDATE client_ledger SET entry_date = ?1, updated_at = ?2 WHERE delivery_id IN (SELECT id FROM delivery WHERE driver_id = ?3 AND delivery_date = ?1)",
    )
    .bind(new_date_millis)
    .bind(now)
    .bind(driver_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(moved)
}

/// Delete a whole driver-day: deliveries (ledger cascades), expenses, and
/// the status row, atomically.
pub async fn delete_day(
    pool: &SqlitePool,
    driver_id: i64,
    day_start: i64,
    day_end: i64,
    date: &str,
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        "DELETE FROM delivery WHERE driver_id = ? AND delivery_date >= ? AND delivery_date < ?",
    )
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(
        "DELETE FROM driver_expense WHERE driver_id = ? AND expense_date >= ? AND expense_date < ?",
    )
    .bind(driver_id)
    .bind(day_start)
    .bind(day_end)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM driver_day_status WHERE driver_id = ? AND date = ?")
        .bind(driver_id)
        .bind(date)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(removed)
}
