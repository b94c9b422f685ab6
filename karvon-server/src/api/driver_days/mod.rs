//! Driver Day API 模块 (日报与整日批量操作)

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/driver-days", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{driver_id}/{date}/report", get(handler::daily_report))
        .route("/reassign", post(handler::reassign))
        .route("/change-date", post(handler::change_date))
        .route("/{driver_id}/{date}", delete(handler::delete_day))
}
