//! Client Ledger Repository
//!
//! Standalone debt/payment rows (`delivery_id` null) are managed here;
//! delivery-mirrored rows are written by the delivery repository and are
//! read-only through this module.

use super::{RepoError, RepoResult};
use shared::models::{ClientBalance, LedgerEntry, LedgerEntryCreate, LedgerEntryUpdate};
use sqlx::SqlitePool;

const LEDGER_SELECT: &str = "SELECT id, client_id, delivery_id, entry_type, amount, entry_date, description, created_at, updated_at FROM client_ledger";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LedgerEntry>> {
    let sql = format!("{LEDGER_SELECT} WHERE id = ?");
    let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// Full merged ledger of a client, newest first
pub async fn find_by_client(pool: &SqlitePool, client_id: i64) -> RepoResult<Vec<LedgerEntry>> {
    let sql = format!("{LEDGER_SELECT} WHERE client_id = ? ORDER BY entry_date DESC, id DESC");
    let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    Ok(entries)
}

/// Outstanding balance with its manual/delivery split
pub async fn balance(pool: &SqlitePool, client_id: i64) -> RepoResult<ClientBalance> {
    let row = sqlx::query_as::<_, (f64, f64, f64)>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN entry_type = 'DEBT_INCURRED' THEN amount ELSE -amount END), 0.0) AS balance,
            COALESCE(SUM(CASE WHEN delivery_id IS NULL THEN (CASE WHEN entry_type = 'DEBT_INCURRED' THEN amount ELSE -amount END) ELSE 0.0 END), 0.0) AS from_manual,
            COALESCE(SUM(CASE WHEN delivery_id IS NOT NULL THEN (CASE WHEN entry_type = 'DEBT_INCURRED' THEN amount ELSE -amount END) ELSE 0.0 END), 0.0) AS from_deliveries
        FROM client_ledger WHERE client_id = ?
        "#,
    )
    .bind(client_id)
    .fetch_one(pool)
    .await?;

    Ok(ClientBalance {
        balance: row.0,
        from_manual: row.1,
        from_deliveries: row.2,
    })
}

/// Create a standalone entry. A repayment larger than the outstanding
/// balance is refused before anything is written (checked and inserted in
/// one transaction). Delivery-embedded repayments carry no such guard.
pub async fn create_standalone(
    pool: &SqlitePool,
    client_id: i64,
    data: &LedgerEntryCreate,
    entry_date: i64,
) -> RepoResult<LedgerEntry> {
    let mut tx = pool.begin().await?;

    if data.entry_type == shared::models::LedgerEntryType::DebtRepaid {
        let outstanding = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(CASE WHEN entry_type = 'DEBT_INCURRED' THEN amount ELSE -amount END), 0.0) FROM client_ledger WHERE client_id = ?",
        )
        .bind(client_id)
        .fetch_one(&mut *tx)
        .await?;

        if data.amount > outstanding {
            return Err(RepoError::BusinessRule(format!(
                "Payment amount {} exceeds outstanding debt {outstanding}",
                data.amount
            )));
        }
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO client_ledger (id, client_id, delivery_id, entry_type, amount, entry_date, description, created_at, updated_at) VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(client_id)
    .bind(data.entry_type)
    .bind(data.amount)
    .bind(entry_date)
    .bind(&data.description)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create ledger entry".into()))
}

/// Update a standalone entry. Delivery mirrors are rejected — they change
/// only through their delivery.
pub async fn update_standalone(
    pool: &SqlitePool,
    id: i64,
    data: &LedgerEntryUpdate,
    entry_date: Option<i64>,
) -> RepoResult<LedgerEntry> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ledger entry {id} not found")))?;
    if existing.delivery_id.is_some() {
        return Err(RepoError::BusinessRule(
            "Delivery-derived ledger entries can only be changed through the delivery".into(),
        ));
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE client_ledger SET amount = COALESCE(?1, amount), entry_date = COALESCE(?2, entry_date), description = COALESCE(?3, description), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.amount)
    .bind(entry_date)
    .bind(&data.description)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ledger entry {id} not found")))
}

/// Delete a standalone entry; delivery mirrors are rejected.
pub async fn delete_standalone(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let existing = match find_by_id(pool, id).await? {
        Some(e) => e,
        None => return Ok(false),
    };
    if existing.delivery_id.is_some() {
        return Err(RepoError::BusinessRule(
            "Delivery-derived ledger entries can only be removed through the delivery".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM client_ledger WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
