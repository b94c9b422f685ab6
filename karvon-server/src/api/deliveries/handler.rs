//! Delivery API Handlers
//!
//! The payment split must add up: amount == cash + card + transfer + debt.
//! Writes keep the client ledger mirrors in sync (repository transaction);
//! deleting the last delivery of a driver-day also clears that day's
//! status row and expenses.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{client, delivery, driver};
use crate::reconcile;
use crate::utils::time;
use crate::utils::validation::validate_money;
use crate::utils::{AppError, AppResult};
use shared::models::{Delivery, DeliveryCreate, DeliveryUpdate, DeliveryWithNames};

/// Query params for delivery listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Business date (`YYYY-MM-DD`)
    pub date: Option<String>,
    pub driver_id: Option<i64>,
    pub client_id: Option<i64>,
}

/// GET /api/deliveries - 配送单列表 (可按日期/司机/客户过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DeliveryWithNames>>> {
    let tz = state.config.timezone;
    let date_range = query
        .date
        .as_deref()
        .map(|d| {
            let date = time::parse_date(d)?;
            Ok::<_, AppError>((
                time::day_start_millis(date, tz),
                time::day_end_millis(date, tz),
            ))
        })
        .transpose()?;

    let deliveries = delivery::find_all(
        &state.pool,
        delivery::DeliveryFilter {
            date_range,
            driver_id: query.driver_id,
            client_id: query.client_id,
        },
    )
    .await?;
    Ok(Json(deliveries))
}

/// GET /api/deliveries/:id - 获取单个配送单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeliveryWithNames>> {
    let delivery = delivery::find_with_names_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Delivery {id} not found")))?;
    Ok(Json(delivery))
}

fn validate_split(amount: f64, cash: f64, card: f64, transfer: f64, debt: f64) -> AppResult<()> {
    if !reconcile::split_matches_total(amount, cash, card, transfer, debt) {
        return Err(AppError::business_rule(format!(
            "Payment split does not add up: amount {amount} != cash {cash} + card {card} + transfer {transfer} + debt {debt}"
        )));
    }
    Ok(())
}

/// POST /api/deliveries - 新建配送单 (含台账镜像)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DeliveryCreate>,
) -> AppResult<Json<Delivery>> {
    validate_money(payload.amount, "amount")?;
    validate_money(payload.cash_amount, "cash_amount")?;
    validate_money(payload.card_amount, "card_amount")?;
    validate_money(payload.transfer_amount, "transfer_amount")?;
    validate_money(payload.debt_amount, "debt_amount")?;
    validate_money(payload.goods_amount, "goods_amount")?;
    validate_money(payload.extra_payment, "extra_payment")?;
    validate_split(
        payload.amount,
        payload.cash_amount,
        payload.card_amount,
        payload.transfer_amount,
        payload.debt_amount,
    )?;

    driver::find_by_id(&state.pool, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {} not found", payload.driver_id)))?;
    client::find_by_id(&state.pool, payload.client_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {} not found", payload.client_id)))?;

    let tz = state.config.timezone;
    let delivery_date = time::parse_timestamp_or_now(payload.delivery_date.as_deref(), tz)?;

    let delivery = delivery::create(&state.pool, &payload, delivery_date).await?;
    Ok(Json(delivery))
}

/// PUT /api/deliveries/:id - 更新配送单 (重写台账镜像)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DeliveryUpdate>,
) -> AppResult<Json<Delivery>> {
    let existing = delivery::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Delivery {id} not found")))?;

    for (value, field) in [
        (payload.amount, "amount"),
        (payload.cash_amount, "cash_amount"),
        (payload.card_amount, "card_amount"),
        (payload.transfer_amount, "transfer_amount"),
        (payload.debt_amount, "debt_amount"),
        (payload.goods_amount, "goods_amount"),
        (payload.extra_payment, "extra_payment"),
    ] {
        if let Some(v) = value {
            validate_money(v, field)?;
        }
    }

    // The split invariant must hold over the merged (new ∪ existing) values
    validate_split(
        payload.amount.unwrap_or(existing.amount),
        payload.cash_amount.unwrap_or(existing.cash_amount),
        payload.card_amount.unwrap_or(existing.card_amount),
        payload.transfer_amount.unwrap_or(existing.transfer_amount),
        payload.debt_amount.unwrap_or(existing.debt_amount),
    )?;

    if let Some(driver_id) = payload.driver_id {
        driver::find_by_id(&state.pool, driver_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Driver {driver_id} not found")))?;
    }
    if let Some(client_id) = payload.client_id {
        client::find_by_id(&state.pool, client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client {client_id} not found")))?;
    }

    let tz = state.config.timezone;
    let delivery_date = payload
        .delivery_date
        .as_deref()
        .map(|v| time::parse_timestamp(v, tz))
        .transpose()?;

    let delivery = delivery::update(&state.pool, id, &payload, delivery_date).await?;
    Ok(Json(delivery))
}

/// DELETE /api/deliveries/:id - 删除配送单
///
/// 若为该司机当日最后一单，连同当日日结状态与开销一并删除。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = delivery::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Delivery {id} not found")))?;

    let tz = state.config.timezone;
    let date = time::millis_to_business_date(existing.delivery_date, tz);
    let deleted = delivery::delete_with_day_cleanup(
        &state.pool,
        id,
        existing.driver_id,
        time::day_start_millis(date, tz),
        time::day_end_millis(date, tz),
        &date.to_string(),
    )
    .await?;

    if !deleted {
        return Err(AppError::not_found(format!("Delivery {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
