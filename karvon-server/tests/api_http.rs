//! HTTP-level tests: drive the real router with `oneshot` requests and
//! check status codes and JSON bodies for the main flows.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{seed_client, seed_driver, test_state};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use karvon_server::core::ServerState;

fn app(state: ServerState) -> axum::Router {
    karvon_server::api::build_app().with_state(state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (state, _dir) = test_state().await;
    let app = app(state);

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn driver_crud_over_http() {
    let (state, _dir) = test_state().await;
    let app = app(state);

    let (status, created) = send(
        &app,
        "POST",
        "/api/drivers",
        Some(json!({"name": "Marek", "phone": "+48 600 100 200"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/api/drivers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Marek");

    let (status, _) = send(
        &app,
        "POST",
        "/api/drivers",
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/drivers/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_client_name_conflicts() {
    let (state, _dir) = test_state().await;
    let app = app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/clients",
        Some(json!({"name": "Sklep u Ani"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(json!({"name": "Sklep u Ani"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn delivery_split_must_add_up() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let app = app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/deliveries",
        Some(json!({
            "driver_id": driver_id,
            "client_id": client_id,
            "amount": 100.0,
            "cash_amount": 60.0,
            "card_amount": 30.0,
            // transfer + debt default to 0 → split sums to 90, not 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, created) = send(
        &app,
        "POST",
        "/api/deliveries",
        Some(json!({
            "driver_id": driver_id,
            "client_id": client_id,
            "delivery_date": "2025-03-10",
            "amount": 100.0,
            "cash_amount": 60.0,
            "card_amount": 30.0,
            "transfer_amount": 10.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["amount"], 100.0);

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/api/deliveries?date=2025-03-10&driver_id={driver_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["driver_name"], "Marek");
}

#[tokio::test]
async fn client_balance_and_overpayment_guard() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let app = app(state);

    for (entry_type, amount) in [("DEBT_INCURRED", 100.0), ("DEBT_REPAID", 40.0)] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/clients/{client_id}/ledger"),
            Some(json!({"entry_type": entry_type, "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Delivery carrying debt 30 and repayment 10
    let (status, _) = send(
        &app,
        "POST",
        "/api/deliveries",
        Some(json!({
            "driver_id": driver_id,
            "client_id": client_id,
            "amount": 30.0,
            "debt_amount": 30.0,
            "extra_payment": 10.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, balance) = send(
        &app,
        "GET",
        &format!("/api/clients/{client_id}/balance"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["balance"], 80.0);
    assert_eq!(balance["from_manual"], 60.0);
    assert_eq!(balance["from_deliveries"], 20.0);

    // Paying more than the outstanding 80 is refused and changes nothing
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/clients/{client_id}/ledger"),
        Some(json!({"entry_type": "DEBT_REPAID", "amount": 81.0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, balance) = send(
        &app,
        "GET",
        &format!("/api/clients/{client_id}/balance"),
        None,
    )
    .await;
    assert_eq!(balance["balance"], 80.0);

    let (status, ledger) = send(
        &app,
        "GET",
        &format!("/api/clients/{client_id}/ledger"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn day_status_upsert_and_version_conflict() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let app = app(state);

    let payload = json!({
        "driver_id": driver_id,
        "date": "2025-03-10",
        "status": "PENDING",
        "total_cash": 720.0,
        "cash_paid": 720.0,
        "banknotes": {"500": 1, "100": 2, "20": 1},
    });
    let (status, first) = send(&app, "POST", "/api/day-statuses", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["version"], 1);

    let (status, second) = send(&app, "POST", "/api/day-statuses", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["version"], 2);
    assert_eq!(second["id"], first["id"]);

    let (status, _) = send(
        &app,
        "POST",
        "/api/day-statuses",
        Some(json!({
            "driver_id": driver_id,
            "date": "2025-03-10",
            "status": "PAID_OFF",
            "expected_version": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn daily_report_reconciles_banknotes() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let app = app(state);

    // 700 cash + 20 repayment, no expenses → net due 720
    let (status, _) = send(
        &app,
        "POST",
        "/api/deliveries",
        Some(json!({
            "driver_id": driver_id,
            "client_id": client_id,
            "delivery_date": "2025-03-10",
            "amount": 700.0,
            "cash_amount": 700.0,
            "extra_payment": 20.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/day-statuses",
        Some(json!({
            "driver_id": driver_id,
            "date": "2025-03-10",
            "status": "PAID_OFF",
            "total_cash": 700.0,
            "cash_paid": 720.0,
            "banknotes": {"500": 1, "100": 2, "20": 1},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = send(
        &app,
        "GET",
        &format!("/api/driver-days/{driver_id}/2025-03-10/report"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["net_cash_due"], 720.0);
    assert_eq!(report["summary"]["counted_total"], 720.0);
    assert_eq!(report["summary"]["difference"], 0.0);
    assert_eq!(report["summary"]["balanced"], true);
    assert_eq!(report["day_status"]["status"], "PAID_OFF");
}

#[tokio::test]
async fn merged_day_statuses_synthesize_pending_rows() {
    let (state, _dir) = test_state().await;
    let reconciled = seed_driver(&state, "Marek").await;
    let unreconciled = seed_driver(&state, "Piotr").await;
    let client_id = seed_client(&state, "Sklep u Ani").await;
    let app = app(state);

    for driver_id in [reconciled, unreconciled] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/deliveries",
            Some(json!({
                "driver_id": driver_id,
                "client_id": client_id,
                "delivery_date": "2025-03-10",
                "amount": 150.0,
                "cash_amount": 150.0,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(
        &app,
        "POST",
        "/api/day-statuses",
        Some(json!({
            "driver_id": reconciled,
            "date": "2025-03-10",
            "status": "PAID_OFF",
            "total_cash": 150.0,
            "cash_paid": 150.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, entries) = send(
        &app,
        "GET",
        "/api/day-statuses?start_date=2025-03-10&end_date=2025-03-10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let manual = entries.iter().find(|e| e["source"] == "MANUAL").unwrap();
    assert_eq!(manual["driver_id"].as_i64().unwrap(), reconciled);

    let synthetic = entries.iter().find(|e| e["source"] == "DELIVERY").unwrap();
    assert_eq!(synthetic["driver_id"].as_i64().unwrap(), unreconciled);
    assert_eq!(synthetic["status"], "PENDING");
    assert_eq!(synthetic["total_cash"], 150.0);
    assert_eq!(
        synthetic["id"],
        format!("delivery:{unreconciled}:2025-03-10")
    );
}

#[tokio::test]
async fn cashbook_summary_combines_three_sources() {
    let (state, _dir) = test_state().await;
    let driver_id = seed_driver(&state, "Marek").await;
    let app = app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/day-statuses",
        Some(json!({
            "driver_id": driver_id,
            "date": "2025-03-10",
            "status": "PAID_OFF",
            "total_cash": 500.0,
            "cash_paid": 500.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/cashbook/incomes",
        Some(json!({"amount": 200.0, "description": "Zwrot kaucji", "entry_date": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, expense) = send(
        &app,
        "POST",
        "/api/cashbook/expenses",
        Some(json!({"amount": 120.0, "description": "Czynsz", "entry_date": "2025-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = send(
        &app,
        "GET",
        "/api/cashbook/summary?start_date=2025-03-10&end_date=2025-03-10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_driver_cash"], 500.0);
    assert_eq!(summary["total_income"], 200.0);
    assert_eq!(summary["total_expense"], 120.0);
    // 500 + 200 - 120
    assert_eq!(summary["total_balance"], 580.0);

    let transactions = summary["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 3);
    let driver_row = transactions
        .iter()
        .find(|t| t["kind"] == "DRIVER_DAY")
        .unwrap();
    assert_eq!(driver_row["editable"], false);
    assert_eq!(driver_row["driver_id"].as_i64().unwrap(), driver_id);

    // Standalone rows stay editable end-to-end
    let expense_id = expense["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/cashbook/expenses/{expense_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stock_flow_over_http() {
    let (state, _dir) = test_state().await;
    let app = app(state);

    let (status, product) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({"name": "Woda 1.5L", "price": 2.5, "stock_quantity": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = product["id"].as_i64().unwrap();

    let (status, result) = send(
        &app,
        "PUT",
        &format!("/api/products/{id}/stock"),
        Some(json!({"log_type": "OUTCOME", "value": 4, "actor": "Anna"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["product"]["stock_quantity"], 6);
    assert_eq!(result["log"]["log_type"], "OUTCOME");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/products/{id}/stock"),
        Some(json!({"log_type": "OUTCOME", "value": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, detail) = send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["stock_quantity"], 6);
    assert_eq!(detail["logs"].as_array().unwrap().len(), 1);
}
