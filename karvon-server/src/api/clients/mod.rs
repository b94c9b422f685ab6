//! Client API 模块 (客户与欠款台账)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/clients", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/deliveries", get(handler::deliveries))
        .route(
            "/{id}/ledger",
            get(handler::ledger).post(handler::create_ledger_entry),
        )
        .route("/{id}/balance", get(handler::balance))
        .route(
            "/ledger/{entry_id}",
            put(handler::update_ledger_entry).delete(handler::delete_ledger_entry),
        )
}
