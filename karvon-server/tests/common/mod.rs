//! Shared test fixtures: a fresh temp-dir database per test
#![allow(dead_code)]

use karvon_server::core::{Config, ServerState};
use karvon_server::db::DbService;
use shared::models::{ClientCreate, DeliveryCreate, DriverCreate};
use tempfile::TempDir;

/// Fresh server state over a temp-dir SQLite file. Keep the TempDir alive
/// for the duration of the test or the database vanishes underneath it.
pub async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("karvon-test.db");
    let db = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("open test database");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    (ServerState::new(config, db.pool), dir)
}

pub async fn seed_driver(state: &ServerState, name: &str) -> i64 {
    karvon_server::db::repository::driver::create(
        &state.pool,
        DriverCreate {
            name: name.into(),
            phone: None,
        },
    )
    .await
    .expect("seed driver")
    .id
}

pub async fn seed_client(state: &ServerState, name: &str) -> i64 {
    karvon_server::db::repository::client::create(
        &state.pool,
        ClientCreate {
            name: name.into(),
            address: None,
            phone: None,
        },
    )
    .await
    .expect("seed client")
    .id
}

/// Cash-heavy delivery payload; split always adds up
pub fn delivery_payload(
    driver_id: i64,
    client_id: i64,
    cash: f64,
    debt: f64,
    extra_payment: f64,
) -> DeliveryCreate {
    DeliveryCreate {
        driver_id,
        client_id,
        delivery_date: None,
        amount: cash + debt,
        cash_amount: cash,
        card_amount: 0.0,
        transfer_amount: 0.0,
        debt_amount: debt,
        goods_amount: 0.0,
        extra_payment,
    }
}
