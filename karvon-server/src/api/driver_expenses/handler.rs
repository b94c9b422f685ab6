//! Driver Expense API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{driver, driver_expense};
use crate::utils::time;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_optional_text, validate_positive_money, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{DriverExpense, DriverExpenseCreate, DriverExpenseUpdate, ExpenseType};

/// Query params for expense listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub driver_id: Option<i64>,
    /// Business date (`YYYY-MM-DD`); with `end_date` forms a range
    pub date: Option<String>,
    pub end_date: Option<String>,
}

/// 只有 OTHER 类型才需要 (也才允许) 自定义名称
fn validate_expense_name(expense_type: ExpenseType, name: &Option<String>) -> AppResult<()> {
    validate_optional_text(name, "name", MAX_NAME_LEN)?;
    if expense_type == ExpenseType::Other {
        match name {
            Some(n) => validate_required_text(n, "name", MAX_NAME_LEN)?,
            None => {
                return Err(AppError::validation(
                    "name is required when expense_type is OTHER",
                ));
            }
        }
    }
    Ok(())
}

/// GET /api/driver-expenses - 开销列表 (可按司机/日期范围过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DriverExpense>>> {
    let tz = state.config.timezone;
    let date_range = match (query.date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((
            time::day_start_millis(time::parse_date(start)?, tz),
            time::day_end_millis(time::parse_date(end)?, tz),
        )),
        (Some(day), None) => {
            let date = time::parse_date(day)?;
            Some((
                time::day_start_millis(date, tz),
                time::day_end_millis(date, tz),
            ))
        }
        (None, Some(_)) => {
            return Err(AppError::validation("end_date requires date"));
        }
        (None, None) => None,
    };

    let expenses = driver_expense::find_all(&state.pool, query.driver_id, date_range).await?;
    Ok(Json(expenses))
}

/// POST /api/driver-expenses - 记一笔司机开销
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DriverExpenseCreate>,
) -> AppResult<Json<DriverExpense>> {
    validate_positive_money(payload.amount, "amount")?;
    validate_expense_name(payload.expense_type, &payload.name)?;

    driver::find_by_id(&state.pool, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {} not found", payload.driver_id)))?;

    let tz = state.config.timezone;
    let expense_date = time::parse_timestamp_or_now(payload.expense_date.as_deref(), tz)?;

    let expense = driver_expense::create(&state.pool, &payload, expense_date).await?;
    Ok(Json(expense))
}

/// PUT /api/driver-expenses/:id - 更新开销
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DriverExpenseUpdate>,
) -> AppResult<Json<DriverExpense>> {
    if let Some(amount) = payload.amount {
        validate_positive_money(amount, "amount")?;
    }
    let existing = driver_expense::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver expense {id} not found")))?;
    let merged_type = payload.expense_type.unwrap_or(existing.expense_type);
    let merged_name = payload.name.clone().or(existing.name);
    validate_expense_name(merged_type, &merged_name)?;

    if let Some(driver_id) = payload.driver_id {
        driver::find_by_id(&state.pool, driver_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Driver {driver_id} not found")))?;
    }

    let tz = state.config.timezone;
    let expense_date = payload
        .expense_date
        .as_deref()
        .map(|v| time::parse_timestamp(v, tz))
        .transpose()?;

    let expense = driver_expense::update(&state.pool, id, &payload, expense_date).await?;
    Ok(Json(expense))
}

/// DELETE /api/driver-expenses/:id - 删除开销
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = driver_expense::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!(
            "Driver expense {id} not found"
        )));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
