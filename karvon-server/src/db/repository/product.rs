//! Product Repository
//!
//! Stock changes go through [`update_stock`], which applies the delta and
//! appends the immutable log row in one transaction.

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductLog, StockLogType};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str =
    "SELECT id, name, price, stock_quantity, created_at, updated_at FROM product";

const LOG_SELECT: &str =
    "SELECT id, product_id, log_type, value, actor, created_at FROM product_log";

pub async fn find_all(pool: &SqlitePool, search: Option<&str>) -> RepoResult<Vec<Product>> {
    let products = match search {
        Some(term) => {
            let pattern = format!("%{term}%");
            let sql = format!("{PRODUCT_SELECT} WHERE name LIKE ? ORDER BY name ASC");
            sqlx::query_as::<_, Product>(&sql)
                .bind(pattern)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{PRODUCT_SELECT} ORDER BY name ASC");
            sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?
        }
    };
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: &ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, price, stock_quantity, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.stock_quantity)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Stock change log of one product, newest first
pub async fn find_logs(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<ProductLog>> {
    let sql = format!("{LOG_SELECT} WHERE product_id = ? ORDER BY created_at DESC, id DESC");
    let logs = sqlx::query_as::<_, ProductLog>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(logs)
}

/// Apply a stock movement and append its log row in one transaction.
/// An OUTCOME larger than the current stock is refused with nothing written.
pub async fn update_stock(
    pool: &SqlitePool,
    product_id: i64,
    log_type: StockLogType,
    value: i64,
    actor: &str,
) -> RepoResult<(Product, ProductLog)> {
    let mut tx = pool.begin().await?;

    let stock = sqlx::query_scalar::<_, i64>("SELECT stock_quantity FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {product_id} not found")))?;

    let new_stock = match log_type {
        StockLogType::Income => stock + value,
        StockLogType::Outcome => {
            if stock < value {
                return Err(RepoError::BusinessRule(format!(
                    "Insufficient stock: {stock} available, {value} requested"
                )));
            }
            stock - value
        }
    };

    let now = shared::util::now_millis();
    sqlx::query("UPDATE product SET stock_quantity = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(new_stock)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    let log_id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product_log (id, product_id, log_type, value, actor, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(log_id)
    .bind(product_id)
    .bind(log_type)
    .bind(value)
    .bind(actor)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let product = find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {product_id} not found")))?;
    let log_sql = format!("{LOG_SELECT} WHERE id = ?");
    let log = sqlx::query_as::<_, ProductLog>(&log_sql)
        .bind(log_id)
        .fetch_one(pool)
        .await?;

    Ok((product, log))
}
