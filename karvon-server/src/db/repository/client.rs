//! Client Repository

use super::{RepoError, RepoResult};
use shared::models::{Client, ClientCreate, ClientUpdate};
use sqlx::SqlitePool;

const CLIENT_SELECT: &str =
    "SELECT id, name, address, phone, created_at, updated_at FROM client";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Client>> {
    let sql = format!("{CLIENT_SELECT} ORDER BY name ASC");
    let clients = sqlx::query_as::<_, Client>(&sql).fetch_all(pool).await?;
    Ok(clients)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Client>> {
    let sql = format!("{CLIENT_SELECT} WHERE id = ?");
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Client>> {
    let sql = format!("{CLIENT_SELECT} WHERE name = ?");
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn create(pool: &SqlitePool, data: ClientCreate) -> RepoResult<Client> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Client with name '{}' already exists",
            data.name
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO client (id, name, address, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create client".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ClientUpdate) -> RepoResult<Client> {
    // Renames must not collide with another client
    if let Some(name) = &data.name
        && let Some(existing) = find_by_name(pool, name).await?
        && existing.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Client with name '{name}' already exists"
        )));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE client SET name = COALESCE(?1, name), address = COALESCE(?2, address), phone = COALESCE(?3, phone), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Client {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}

/// Delete a client. Refused while deliveries or ledger entries reference it.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Ok(false);
    }

    let deliveries = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM delivery WHERE client_id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    let ledger_rows = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM client_ledger WHERE client_id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    if deliveries > 0 || ledger_rows > 0 {
        return Err(RepoError::BusinessRule(
            "Cannot delete client with existing deliveries or debts".into(),
        ));
    }

    sqlx::query("DELETE FROM client WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
