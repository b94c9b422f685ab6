//! Cashbook API 模块 (日常收支与汇总)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cashbook", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/incomes",
            get(handler::list_incomes).post(handler::create_income),
        )
        .route(
            "/incomes/{id}",
            put(handler::update_income).delete(handler::delete_income),
        )
        .route(
            "/expenses",
            get(handler::list_expenses).post(handler::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(handler::update_expense).delete(handler::delete_expense),
        )
        .route("/summary", get(handler::summary))
}
