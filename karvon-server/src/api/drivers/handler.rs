//! Driver API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{delivery, driver};
use crate::utils::time;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Driver, DriverCreate, DriverUpdate};

/// GET /api/drivers - 获取司机列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Driver>>> {
    let drivers = driver::find_all(&state.pool).await?;
    Ok(Json(drivers))
}

/// GET /api/drivers/:id - 获取单个司机
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Driver>> {
    let driver = driver::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {id} not found")))?;
    Ok(Json(driver))
}

/// POST /api/drivers - 新建司机
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DriverCreate>,
) -> AppResult<Json<Driver>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let driver = driver::create(&state.pool, payload).await?;
    Ok(Json(driver))
}

/// PUT /api/drivers/:id - 更新司机
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DriverUpdate>,
) -> AppResult<Json<Driver>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let driver = driver::update(&state.pool, id, payload).await?;
    Ok(Json(driver))
}

/// DELETE /api/drivers/:id - 删除司机及其全部关联数据
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = driver::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Driver {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct CashTotalQuery {
    pub date: String,
}

#[derive(serde::Serialize)]
pub struct CashTotalResponse {
    pub total_cash: f64,
}

/// GET /api/drivers/:id/cash-total?date=YYYY-MM-DD - 当日现金合计
pub async fn cash_total(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<CashTotalQuery>,
) -> AppResult<Json<CashTotalResponse>> {
    let tz = state.config.timezone;
    let date = time::parse_date(&query.date)?;
    let total_cash = delivery::sum_cash_for_driver_day(
        &state.pool,
        id,
        time::day_start_millis(date, tz),
        time::day_end_millis(date, tz),
    )
    .await?;
    Ok(Json(CashTotalResponse { total_cash }))
}
