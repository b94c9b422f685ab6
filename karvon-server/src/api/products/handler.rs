//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::validation::{MAX_NAME_LEN, validate_money, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Product, ProductCreate, ProductWithLogs, StockUpdate, StockUpdateResult};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// GET /api/products?search=xxx - 商品列表 (按名称模糊过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool, query.search.as_deref()).await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 商品详情 (含库存流水)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductWithLogs>> {
    let product = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    let logs = product::find_logs(&state.pool, id).await?;
    Ok(Json(ProductWithLogs { product, logs }))
}

/// POST /api/products - 新建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_money(payload.price, "price")?;
    if payload.stock_quantity < 0 {
        return Err(AppError::validation("stock_quantity must be non-negative"));
    }

    let product = product::create(&state.pool, &payload).await?;
    Ok(Json(product))
}

/// PUT /api/products/:id/stock - 出入库 (库存变更 + 流水，单事务)
///
/// 出库数量超过现有库存时拒绝，库存不变。
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> AppResult<Json<StockUpdateResult>> {
    if payload.value <= 0 {
        return Err(AppError::validation("value must be a positive quantity"));
    }
    let actor = payload.actor.as_deref().unwrap_or("system");
    validate_required_text(actor, "actor", MAX_NAME_LEN)?;

    let (product, log) =
        product::update_stock(&state.pool, id, payload.log_type, payload.value, actor).await?;
    Ok(Json(StockUpdateResult { product, log }))
}
