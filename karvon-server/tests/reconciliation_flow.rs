//! Repository-level integration tests for the reconciliation rules:
//! day-status upsert semantics, delete cascades, the unified ledger,
//! stock movements, and atomic day operations.

mod common;

use common::{delivery_payload, seed_client, seed_driver, test_state};
use karvon_server::db::repository::{
    RepoError, day_status, delivery, driver_expense, ledger, product,
};
use karvon_server::utils::time;
use shared::models::{
    DayStatus, DriverDayStatusUpsert, DriverExpenseCreate, ExpenseType, LedgerEntryCreate,
    LedgerEntryType, ProductCreate, StockLogType,
};

const DATE: &str = "2025-03-10";

fn day_bounds(state: &karvon_server::core::ServerState) -> (i64, i64) {
    let tz = state.config.timezone;
    let day = time::parse_date(DATE).unwrap();
    (time::day_start_millis(day, tz), time::day_end_millis(day, tz))
}

fn upsert_payload(driver_id: i64, cash_paid: f64) -> DriverDayStatusUpsert {
    DriverDayStatusUpsert {
        driver_id,
        date: DATE.into(),
        status: DayStatus::Pending,
        total_cash: 500.0,
        cash_paid,
        notes: None,
        banknotes: Default::default(),
        expected_version: None,
    }
}

#[tokio::test]
async fn upsert_is_keyed_by_driver_and_date() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;

    let first = day_status::upsert(&state.pool, &upsert_payload(driver_id, 100.0))
        .await
        .unwrap();
    assert_eq!(first.version, 1);

    let mut second = upsert_payload(driver_id, 250.0);
    second.status = DayStatus::PaidOff;
    second.notes = Some("wieczorne rozliczenie".into());
    let second = day_status::upsert(&state.pool, &second).await.unwrap();

    // Same row, second write wins, version bumped
    assert_eq!(second.id, first.id);
    assert_eq!(second.cash_paid, 250.0);
    assert_eq!(second.status, DayStatus::PaidOff);
    assert_eq!(second.version, 2);

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM driver_day_status WHERE driver_id = ? AND date = ?",
    )
    .bind(driver_id)
    .bind(DATE)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn stale_version_is_rejected_without_writing() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;

    day_status::upsert(&state.pool, &upsert_payload(driver_id, 100.0))
        .await
        .unwrap();
    day_status::upsert(&state.pool, &upsert_payload(driver_id, 200.0))
        .await
        .unwrap();

    // Writer still holding version 1 loses
    let mut stale = upsert_payload(driver_id, 999.0);
    stale.expected_version = Some(1);
    let err = day_status::upsert(&state.pool, &stale).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    let current = day_status::find_by_driver_date(&state.pool, driver_id, DATE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.cash_paid, 200.0);
    assert_eq!(current.version, 2);

    // Matching version goes through
    let mut fresh = upsert_payload(driver_id, 300.0);
    fresh.expected_version = Some(2);
    let updated = day_status::upsert(&state.pool, &fresh).await.unwrap();
    assert_eq!(updated.cash_paid, 300.0);
    assert_eq!(updated.version, 3);
}

#[tokio::test]
async fn deleting_last_delivery_clears_the_day() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let (start, end) = day_bounds(&state);

    let kept = delivery::create(
        &state.pool,
        &delivery_payload(driver_id, client_id, 100.0, 0.0, 0.0),
        start + 3_600_000,
    )
    .await
    .unwrap();
    let doomed = delivery::create(
        &state.pool,
        &delivery_payload(driver_id, client_id, 50.0, 0.0, 0.0),
        start + 7_200_000,
    )
    .await
    .unwrap();

    driver_expense::create(
        &state.pool,
        &DriverExpenseCreate {
            driver_id,
            expense_type: ExpenseType::Fuel,
            name: None,
            amount: 30.0,
            expense_date: None,
        },
        start + 1_000,
    )
    .await
    .unwrap();
    day_status::upsert(&state.pool, &upsert_payload(driver_id, 120.0))
        .await
        .unwrap();

    // Deleting one of two same-day deliveries keeps the day's records
    delivery::delete_with_day_cleanup(&state.pool, doomed.id, driver_id, start, end, DATE)
        .await
        .unwrap();
    assert!(
        day_status::find_by_driver_date(&state.pool, driver_id, DATE)
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(
        driver_expense::find_for_driver_day(&state.pool, driver_id, start, end)
            .await
            .unwrap()
            .len(),
        1
    );

    // Deleting the last one clears status and expenses too
    delivery::delete_with_day_cleanup(&state.pool, kept.id, driver_id, start, end, DATE)
        .await
        .unwrap();
    assert!(
        day_status::find_by_driver_date(&state.pool, driver_id, DATE)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        driver_expense::find_for_driver_day(&state.pool, driver_id, start, end)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn ledger_merges_manual_and_delivery_sources() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let (start, _) = day_bounds(&state);

    ledger::create_standalone(
        &state.pool,
        client_id,
        &LedgerEntryCreate {
            entry_type: LedgerEntryType::DebtIncurred,
            amount: 100.0,
            entry_date: None,
            description: None,
        },
        start,
    )
    .await
    .unwrap();
    ledger::create_standalone(
        &state.pool,
        client_id,
        &LedgerEntryCreate {
            entry_type: LedgerEntryType::DebtRepaid,
            amount: 40.0,
            entry_date: None,
            description: None,
        },
        start + 1,
    )
    .await
    .unwrap();

    let dlv = delivery::create(
        &state.pool,
        &delivery_payload(driver_id, client_id, 0.0, 30.0, 10.0),
        start + 2,
    )
    .await
    .unwrap();

    // (100 - 40) + (30 - 10) = 80
    let balance = ledger::balance(&state.pool, client_id).await.unwrap();
    assert_eq!(balance.balance, 80.0);
    assert_eq!(balance.from_manual, 60.0);
    assert_eq!(balance.from_deliveries, 20.0);

    let entries = ledger::find_by_client(&state.pool, client_id).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries.iter().filter(|e| !e.editable()).count(), 2);

    // Mirror rows cannot be edited or deleted directly
    let mirror = entries.iter().find(|e| e.delivery_id.is_some()).unwrap();
    let err = ledger::delete_standalone(&state.pool, mirror.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::BusinessRule(_)));

    // Deleting the delivery takes its mirrors along
    let tz = state.config.timezone;
    let date = time::millis_to_business_date(dlv.delivery_date, tz);
    delivery::delete_with_day_cleanup(
        &state.pool,
        dlv.id,
        driver_id,
        time::day_start_millis(date, tz),
        time::day_end_millis(date, tz),
        &date.to_string(),
    )
    .await
    .unwrap();
    let balance = ledger::balance(&state.pool, client_id).await.unwrap();
    assert_eq!(balance.balance, 60.0);
    assert_eq!(balance.from_deliveries, 0.0);
}

#[tokio::test]
async fn overpayment_is_rejected_and_nothing_is_written() {
    let (state, _dir) = test_state().await;
    let client_id = seed_client(&state, "Sklep u Ani").await;

    ledger::create_standalone(
        &state.pool,
        client_id,
        &LedgerEntryCreate {
            entry_type: LedgerEntryType::DebtIncurred,
            amount: 50.0,
            entry_date: None,
            description: None,
        },
        1,
    )
    .await
    .unwrap();

    let err = ledger::create_standalone(
        &state.pool,
        client_id,
        &LedgerEntryCreate {
            entry_type: LedgerEntryType::DebtRepaid,
            amount: 80.0,
            entry_date: None,
            description: None,
        },
        2,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::BusinessRule(_)));

    let entries = ledger::find_by_client(&state.pool, client_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        ledger::balance(&state.pool, client_id).await.unwrap().balance,
        50.0
    );
}

#[tokio::test]
async fn stock_round_trip_restores_quantity() {
    let (state, _dir) = test_state().await;
    let created = product::create(
        &state.pool,
        &ProductCreate {
            name: "Woda 1.5L".into(),
            price: 2.5,
            stock_quantity: 40,
        },
    )
    .await
    .unwrap();

    let (p, _) = product::update_stock(&state.pool, created.id, StockLogType::Income, 15, "Anna")
        .await
        .unwrap();
    assert_eq!(p.stock_quantity, 55);

    let (p, _) = product::update_stock(&state.pool, created.id, StockLogType::Outcome, 15, "Anna")
        .await
        .unwrap();
    assert_eq!(p.stock_quantity, 40);

    // Outcome beyond stock: refused, stock and log untouched
    let err = product::update_stock(&state.pool, created.id, StockLogType::Outcome, 41, "Anna")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::BusinessRule(_)));
    let current = product::find_by_id(&state.pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.stock_quantity, 40);
    assert_eq!(
        product::find_logs(&state.pool, created.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn reassign_day_moves_everything_at_once() {
    let (state, _dir) = test_state().await;
    let source = seed_driver(&state, "Marek").await;
    let target = seed_driver(&state, "Piotr").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let (start, end) = day_bounds(&state);

    for offset in [0, 1, 2] {
        delivery::create(
            &state.pool,
            &delivery_payload(source, client_id, 100.0, 0.0, 0.0),
            start + offset,
        )
        .await
        .unwrap();
    }
    driver_expense::create(
        &state.pool,
        &DriverExpenseCreate {
            driver_id: source,
            expense_type: ExpenseType::Fuel,
            name: None,
            amount: 30.0,
            expense_date: None,
        },
        start,
    )
    .await
    .unwrap();
    day_status::upsert(&state.pool, &upsert_payload(source, 300.0))
        .await
        .unwrap();

    let moved = delivery::reassign_day(&state.pool, source, target, start, end, DATE)
        .await
        .unwrap();
    assert_eq!(moved, 3);

    assert!(
        delivery::find_for_driver_day(&state.pool, source, start, end)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        delivery::find_for_driver_day(&state.pool, target, start, end)
            .await
            .unwrap()
            .len(),
        3
    );
    assert!(
        driver_expense::find_for_driver_day(&state.pool, source, start, end)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        day_status::find_by_driver_date(&state.pool, source, DATE)
            .await
            .unwrap()
            .is_none()
    );
    let target_status = day_status::find_by_driver_date(&state.pool, target, DATE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(target_status.cash_paid, 300.0);
}
