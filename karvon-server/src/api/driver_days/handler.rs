//! Driver Day API Handlers
//!
//! The daily report is the reconciliation view: the day's deliveries and
//! expenses plus the computed cash summary against the saved banknote
//! count. The bulk operations (reassign / re-date / wipe a whole day) are
//! single transactions — a crash can never leave half a day moved.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{day_status, delivery, driver, driver_expense};
use crate::reconcile;
use crate::utils::time;
use crate::utils::{AppError, AppResult};
use shared::models::DriverDayReport;

/// GET /api/driver-days/:driver_id/:date/report - 司机日报
pub async fn daily_report(
    State(state): State<ServerState>,
    Path((driver_id, date)): Path<(i64, String)>,
) -> AppResult<Json<DriverDayReport>> {
    let tz = state.config.timezone;
    let day = time::parse_date(&date)?;
    let (start, end) = (time::day_start_millis(day, tz), time::day_end_millis(day, tz));

    let driver = driver::find_by_id(&state.pool, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {driver_id} not found")))?;

    let deliveries = delivery::find_for_driver_day(&state.pool, driver_id, start, end).await?;
    let expenses =
        driver_expense::find_for_driver_day(&state.pool, driver_id, start, end).await?;
    let status = day_status::find_by_driver_date(&state.pool, driver_id, &date).await?;

    let summary = reconcile::day_summary(
        &deliveries,
        &expenses,
        status.as_ref().map(|s| &s.banknotes),
    );

    Ok(Json(DriverDayReport {
        driver,
        date,
        deliveries,
        expenses,
        day_status: status,
        summary,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReassignPayload {
    pub driver_id: i64,
    /// Business date (`YYYY-MM-DD`)
    pub date: String,
    pub target_driver_id: i64,
}

/// POST /api/driver-days/reassign - 整日移交给另一位司机 (单事务)
pub async fn reassign(
    State(state): State<ServerState>,
    Json(payload): Json<ReassignPayload>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.driver_id == payload.target_driver_id {
        return Err(AppError::validation(
            "target_driver_id must differ from driver_id",
        ));
    }

    let tz = state.config.timezone;
    let day = time::parse_date(&payload.date)?;

    driver::find_by_id(&state.pool, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {} not found", payload.driver_id)))?;
    driver::find_by_id(&state.pool, payload.target_driver_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Driver {} not found", payload.target_driver_id))
        })?;

    let moved = delivery::reassign_day(
        &state.pool,
        payload.driver_id,
        payload.target_driver_id,
        time::day_start_millis(day, tz),
        time::day_end_millis(day, tz),
        &payload.date,
    )
    .await?;

    Ok(Json(serde_json::json!({ "moved_deliveries": moved })))
}

#[derive(Debug, Deserialize)]
pub struct ChangeDatePayload {
    pub driver_id: i64,
    /// Business date (`YYYY-MM-DD`)
    pub date: String,
    /// Target business date (`YYYY-MM-DD`)
    pub new_date: String,
}

/// POST /api/driver-days/change-date - 整日改期 (单事务)
pub async fn change_date(
    State(state): State<ServerState>,
    Json(payload): Json<ChangeDatePayload>,
) -> AppResult<Json<serde_json::Value>> {
    let tz = state.config.timezone;
    let day = time::parse_date(&payload.date)?;
    let new_day = time::parse_date(&payload.new_date)?;
    if day == new_day {
        return Err(AppError::validation("new_date must differ from date"));
    }

    driver::find_by_id(&state.pool, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {} not found", payload.driver_id)))?;

    let moved = delivery::change_day_date(
        &state.pool,
        payload.driver_id,
        time::day_start_millis(day, tz),
        time::day_end_millis(day, tz),
        time::day_start_millis(new_day, tz),
    )
    .await?;

    Ok(Json(serde_json::json!({ "moved_deliveries": moved })))
}

/// DELETE /api/driver-days/:driver_id/:date - 删除整日数据 (单事务)
pub async fn delete_day(
    State(state): State<ServerState>,
    Path((driver_id, date)): Path<(i64, String)>,
) -> AppResult<Json<serde_json::Value>> {
    let tz = state.config.timezone;
    let day = time::parse_date(&date)?;

    driver::find_by_id(&state.pool, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {driver_id} not found")))?;

    let removed = delivery::delete_day(
        &state.pool,
        driver_id,
        time::day_start_millis(day, tz),
        time::day_end_millis(day, tz),
        &date,
    )
    .await?;

    Ok(Json(serde_json::json!({ "removed_deliveries": removed })))
}
