//! Client API Handlers
//!
//! Clients plus their unified debt ledger. Standalone ledger rows are
//! created/edited here; delivery-mirrored rows only through deliveries.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{client, delivery, ledger};
use crate::utils::time;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_positive_money, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Client, ClientBalance, ClientCreate, ClientUpdate, DeliveryWithNames, LedgerEntry,
    LedgerEntryCreate, LedgerEntryUpdate,
};

/// GET /api/clients - 获取客户列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Client>>> {
    let clients = client::find_all(&state.pool).await?;
    Ok(Json(clients))
}

/// GET /api/clients/:id - 获取单个客户
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    let client = client::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {id} not found")))?;
    Ok(Json(client))
}

/// POST /api/clients - 新建客户 (名称唯一)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<Json<Client>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let client = client::create(&state.pool, payload).await?;
    Ok(Json(client))
}

/// PUT /api/clients/:id - 更新客户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<Client>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let client = client::update(&state.pool, id, payload).await?;
    Ok(Json(client))
}

/// DELETE /api/clients/:id - 删除客户 (有配送或台账记录时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = client::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Client {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /api/clients/:id/deliveries - 客户的配送记录
pub async fn deliveries(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<DeliveryWithNames>>> {
    ensure_client(&state, id).await?;
    let deliveries = delivery::find_all(
        &state.pool,
        delivery::DeliveryFilter {
            client_id: Some(id),
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(deliveries))
}

/// GET /api/clients/:id/ledger - 合并台账 (手工记录 + 配送镜像)，按日期倒序
pub async fn ledger(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    ensure_client(&state, id).await?;
    let entries = ledger::find_by_client(&state.pool, id).await?;
    Ok(Json(entries))
}

/// GET /api/clients/:id/balance - 当前欠款余额及来源拆分
pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ClientBalance>> {
    ensure_client(&state, id).await?;
    let balance = ledger::balance(&state.pool, id).await?;
    Ok(Json(balance))
}

/// POST /api/clients/:id/ledger - 手工记一笔欠款或还款
///
/// 还款金额超过当前余额时拒绝，不落库。
pub async fn create_ledger_entry(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<LedgerEntryCreate>,
) -> AppResult<Json<LedgerEntry>> {
    ensure_client(&state, id).await?;
    validate_positive_money(payload.amount, "amount")?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let tz = state.config.timezone;
    let entry_date = time::parse_timestamp_or_now(payload.entry_date.as_deref(), tz)?;

    let entry = ledger::create_standalone(&state.pool, id, &payload, entry_date).await?;
    Ok(Json(entry))
}

/// PUT /api/clients/ledger/:entry_id - 更新手工台账记录
pub async fn update_ledger_entry(
    State(state): State<ServerState>,
    Path(entry_id): Path<i64>,
    Json(payload): Json<LedgerEntryUpdate>,
) -> AppResult<Json<LedgerEntry>> {
    if let Some(amount) = payload.amount {
        validate_positive_money(amount, "amount")?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let tz = state.config.timezone;
    let entry_date = payload
        .entry_date
        .as_deref()
        .map(|v| time::parse_timestamp(v, tz))
        .transpose()?;

    let entry = ledger::update_standalone(&state.pool, entry_id, &payload, entry_date).await?;
    Ok(Json(entry))
}

/// DELETE /api/clients/ledger/:entry_id - 删除手工台账记录
pub async fn delete_ledger_entry(
    State(state): State<ServerState>,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = ledger::delete_standalone(&state.pool, entry_id).await?;
    if !deleted {
        return Err(AppError::not_found(format!(
            "Ledger entry {entry_id} not found"
        )));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn ensure_client(state: &ServerState, id: i64) -> AppResult<()> {
    client::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {id} not found")))?;
    Ok(())
}
