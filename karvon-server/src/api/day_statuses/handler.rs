//! Driver Day Status API Handlers
//!
//! The merged listing overlays stored reconciliation rows with synthetic
//! PENDING rows for driver-days that have deliveries but were never
//! reconciled, so nothing with cash in motion can hide from the
//! transactions view.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{day_status, delivery, driver};
use crate::utils::time;
use crate::utils::validation::{MAX_NOTE_LEN, validate_money, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    DayCashTotal, DayStatus, DayStatusEntry, DayStatusSource, DriverDayStatus,
    DriverDayStatusUpsert,
};

#[derive(Debug, Deserialize)]
pub struct SingleQuery {
    pub driver_id: i64,
    /// Business date (`YYYY-MM-DD`)
    pub date: String,
}

/// GET /api/day-statuses/single?driver_id=&date= - 单条日结状态
pub async fn get_single(
    State(state): State<ServerState>,
    Query(query): Query<SingleQuery>,
) -> AppResult<Json<Option<DriverDayStatus>>> {
    time::parse_date(&query.date)?;
    let status =
        day_status::find_by_driver_date(&state.pool, query.driver_id, &query.date).await?;
    Ok(Json(status))
}

/// POST /api/day-statuses - 按 (driver_id, date) 幂等写入
///
/// 携带 expected_version 时做乐观并发检查，不带则后写覆盖。
pub async fn upsert(
    State(state): State<ServerState>,
    Json(payload): Json<DriverDayStatusUpsert>,
) -> AppResult<Json<DriverDayStatus>> {
    time::parse_date(&payload.date)?;
    validate_money(payload.total_cash, "total_cash")?;
    validate_money(payload.cash_paid, "cash_paid")?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    for (denomination, count) in &payload.banknotes {
        if denomination.parse::<f64>().is_err() {
            return Err(AppError::validation(format!(
                "Invalid banknote denomination: {denomination}"
            )));
        }
        if *count < 0 {
            return Err(AppError::validation(format!(
                "Banknote count for {denomination} must be non-negative"
            )));
        }
    }

    driver::find_by_id(&state.pool, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Driver {} not found", payload.driver_id)))?;

    let status = day_status::upsert(&state.pool, &payload).await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub driver_id: Option<i64>,
    /// Overlay synthetic rows for delivery-days without a stored status
    /// (default true)
    pub include_delivery_days: Option<bool>,
}

/// GET /api/day-statuses - 合并列表 (已存日结 + 配送日补位行)，按日期倒序
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DayStatusEntry>>> {
    let tz = state.config.timezone;

    let stored = day_status::find_in_range(
        &state.pool,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.driver_id,
    )
    .await?;

    let mut entries: Vec<DayStatusEntry> = stored
        .iter()
        .map(|s| DayStatusEntry {
            id: s.id.to_string(),
            driver_id: s.driver_id,
            driver_name: s.driver_name.clone(),
            date: s.date.clone(),
            status: s.status,
            total_cash: s.total_cash,
            cash_paid: s.cash_paid,
            notes: s.notes.clone(),
            source: DayStatusSource::Manual,
        })
        .collect();

    if query.include_delivery_days.unwrap_or(true) {
        let date_range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
            (None, None) => None,
            (start, end) => {
                let start_millis = start
                    .map(|d| Ok::<_, AppError>(time::day_start_millis(time::parse_date(d)?, tz)))
                    .transpose()?
                    .unwrap_or(0);
                let end_millis = end
                    .map(|d| Ok::<_, AppError>(time::day_end_millis(time::parse_date(d)?, tz)))
                    .transpose()?
                    .unwrap_or(i64::MAX);
                Some((start_millis, end_millis))
            }
        };

        let deliveries = delivery::find_all(
            &state.pool,
            delivery::DeliveryFilter {
                date_range,
                driver_id: query.driver_id,
                client_id: None,
            },
        )
        .await?;

        let covered: HashSet<(i64, String)> = entries
            .iter()
            .map(|e| (e.driver_id, e.date.clone()))
            .collect();

        // Group deliveries by (driver, business day), sum cash
        let mut synthesized: Vec<DayStatusEntry> = Vec::new();
        for d in deliveries {
            let date = time::millis_to_business_date(d.delivery_date, tz).to_string();
            let key = (d.driver_id, date.clone());
            if covered.contains(&key) {
                continue;
            }
            match synthesized
                .iter_mut()
                .find(|e| e.driver_id == d.driver_id && e.date == date)
            {
                Some(entry) => entry.total_cash += d.cash_amount,
                None => synthesized.push(DayStatusEntry {
                    id: format!("delivery:{}:{}", d.driver_id, date),
                    driver_id: d.driver_id,
                    driver_name: d.driver_name.clone(),
                    date,
                    status: DayStatus::Pending,
                    total_cash: d.cash_amount,
                    cash_paid: 0.0,
                    notes: None,
                    source: DayStatusSource::Delivery,
                }),
            }
        }
        entries.extend(synthesized);
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date).then(a.driver_name.cmp(&b.driver_name)));
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct CashTotalQuery {
    pub date: String,
}

/// GET /api/day-statuses/cash-total?date= - 当日所有司机已交现金合计
pub async fn cash_total(
    State(state): State<ServerState>,
    Query(query): Query<CashTotalQuery>,
) -> AppResult<Json<DayCashTotal>> {
    time::parse_date(&query.date)?;
    let total_cash = day_status::sum_cash_paid(&state.pool, &query.date).await?;
    Ok(Json(DayCashTotal { total_cash }))
}
