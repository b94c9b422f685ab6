//! Cashbook API Handlers
//!
//! Standalone income/expense bookkeeping plus the business-wide summary
//! that folds in driver day-status cash.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::cashbook::{self, CashTable};
use crate::db::repository::day_status;
use crate::utils::time;
use crate::utils::validation::{MAX_NOTE_LEN, validate_positive_money, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    CashEntry, CashEntryCreate, CashEntryUpdate, CashTransaction, CashTransactionKind,
    CashbookSummary,
};

/// Query params: optional inclusive business-date range
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_range(
    state: &ServerState,
    query: &RangeQuery,
) -> AppResult<Option<(i64, i64)>> {
    let tz = state.config.timezone;
    match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (None, None) => Ok(None),
        (start, end) => {
            let start_millis = start
                .map(|d| Ok::<_, AppError>(time::day_start_millis(time::parse_date(d)?, tz)))
                .transpose()?
                .unwrap_or(0);
            let end_millis = end
                .map(|d| Ok::<_, AppError>(time::day_end_millis(time::parse_date(d)?, tz)))
                .transpose()?
                .unwrap_or(i64::MAX);
            Ok(Some((start_millis, end_millis)))
        }
    }
}

fn validate_entry_create(payload: &CashEntryCreate) -> AppResult<()> {
    validate_positive_money(payload.amount, "amount")?;
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_entry_update(payload: &CashEntryUpdate) -> AppResult<()> {
    if let Some(amount) = payload.amount {
        validate_positive_money(amount, "amount")?;
    }
    if let Some(description) = &payload.description {
        validate_required_text(description, "description", MAX_NOTE_LEN)?;
    }
    Ok(())
}

// ── Incomes ─────────────────────────────────────────────────────────

/// GET /api/cashbook/incomes - 日常收入列表
pub async fn list_incomes(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<CashEntry>>> {
    let range = parse_range(&state, &query)?;
    let entries = cashbook::find_all(&state.pool, CashTable::Income, range).await?;
    Ok(Json(entries))
}

/// POST /api/cashbook/incomes - 记一笔收入
pub async fn create_income(
    State(state): State<ServerState>,
    Json(payload): Json<CashEntryCreate>,
) -> AppResult<Json<CashEntry>> {
    create_entry(&state, CashTable::Income, payload).await
}

/// PUT /api/cashbook/incomes/:id - 更新收入
pub async fn update_income(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CashEntryUpdate>,
) -> AppResult<Json<CashEntry>> {
    update_entry(&state, CashTable::Income, id, payload).await
}

/// DELETE /api/cashbook/incomes/:id - 删除收入
pub async fn delete_income(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    delete_entry(&state, CashTable::Income, id).await
}

// ── Expenses ────────────────────────────────────────────────────────

/// GET /api/cashbook/expenses - 日常支出列表
pub async fn list_expenses(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<CashEntry>>> {
    let range = parse_range(&state, &query)?;
    let entries = cashbook::find_all(&state.pool, CashTable::Expense, range).await?;
    Ok(Json(entries))
}

/// POST /api/cashbook/expenses - 记一笔支出
pub async fn create_expense(
    State(state): State<ServerState>,
    Json(payload): Json<CashEntryCreate>,
) -> AppResult<Json<CashEntry>> {
    create_entry(&state, CashTable::Expense, payload).await
}

/// PUT /api/cashbook/expenses/:id - 更新支出
pub async fn update_expense(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CashEntryUpdate>,
) -> AppResult<Json<CashEntry>> {
    update_entry(&state, CashTable::Expense, id, payload).await
}

/// DELETE /api/cashbook/expenses/:id - 删除支出
pub async fn delete_expense(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    delete_entry(&state, CashTable::Expense, id).await
}

// ── Shared plumbing ─────────────────────────────────────────────────

async fn create_entry(
    state: &ServerState,
    table: CashTable,
    payload: CashEntryCreate,
) -> AppResult<Json<CashEntry>> {
    validate_entry_create(&payload)?;
    let tz = state.config.timezone;
    let entry_date = time::parse_timestamp_or_now(payload.entry_date.as_deref(), tz)?;
    let entry = cashbook::create(&state.pool, table, &payload, entry_date).await?;
    Ok(Json(entry))
}

async fn update_entry(
    state: &ServerState,
    table: CashTable,
    id: i64,
    payload: CashEntryUpdate,
) -> AppResult<Json<CashEntry>> {
    validate_entry_update(&payload)?;
    let tz = state.config.timezone;
    let entry_date = payload
        .entry_date
        .as_deref()
        .map(|v| time::parse_timestamp(v, tz))
        .transpose()?;
    let entry = cashbook::update(&state.pool, table, id, &payload, entry_date).await?;
    Ok(Json(entry))
}

async fn delete_entry(state: &ServerState, table: CashTable, id: i64) -> AppResult<StatusCode> {
    let deleted = cashbook::delete(&state.pool, table, id).await?;
    if !deleted {
        return Err(AppError::not_found("Cashbook entry not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Summary ─────────────────────────────────────────────────────────

/// GET /api/cashbook/summary - 全店现金日况
///
/// total_balance = Σ 司机已交现金 + Σ 收入 − Σ 支出，
/// 附按日期倒序的合并流水；司机行只读，链接回司机日视图。
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<CashbookSummary>> {
    let tz = state.config.timezone;
    let range = parse_range(&state, &query)?;

    let statuses = day_status::find_in_range(
        &state.pool,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        None,
    )
    .await?;
    let incomes = cashbook::find_all(&state.pool, CashTable::Income, range).await?;
    let expenses = cashbook::find_all(&state.pool, CashTable::Expense, range).await?;

    let total_driver_cash: f64 = statuses.iter().map(|s| s.cash_paid).sum();
    let total_income: f64 = incomes.iter().map(|e| e.amount).sum();
    let total_expense: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut transactions: Vec<CashTransaction> = Vec::new();
    for s in &statuses {
        transactions.push(CashTransaction {
            id: format!("driver:{}:{}", s.driver_id, s.date),
            kind: CashTransactionKind::DriverDay,
            amount: s.cash_paid,
            description: format!("Cash from {}", s.driver_name),
            entry_date: time::day_start_millis(time::parse_date(&s.date)?, tz),
            editable: false,
            driver_id: Some(s.driver_id),
            date: Some(s.date.clone()),
        });
    }
    for e in &incomes {
        transactions.push(CashTransaction {
            id: e.id.to_string(),
            kind: CashTransactionKind::Income,
            amount: e.amount,
            description: e.description.clone(),
            entry_date: e.entry_date,
            editable: true,
            driver_id: None,
            date: None,
        });
    }
    for e in &expenses {
        transactions.push(CashTransaction {
            id: e.id.to_string(),
            kind: CashTransactionKind::Expense,
            amount: e.amount,
            description: e.description.clone(),
            entry_date: e.entry_date,
            editable: true,
            driver_id: None,
            date: None,
        });
    }
    transactions.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));

    Ok(Json(CashbookSummary {
        total_driver_cash,
        total_income,
        total_expense,
        total_balance: total_driver_cash + total_income - total_expense,
        transactions,
    }))
}
