//! Driver Day Status API 模块 (日结状态)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/day-statuses", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::upsert))
        .route("/single", get(handler::get_single))
        .route("/cash-total", get(handler::cash_total))
}
