//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`drivers`] - 司机管理接口
//! - [`clients`] - 客户与欠款台账接口
//! - [`deliveries`] - 配送单接口
//! - [`driver_expenses`] - 司机开销接口
//! - [`day_statuses`] - 日结状态接口
//! - [`driver_days`] - 司机日报与整日批量操作
//! - [`cashbook`] - 日常收支与汇总
//! - [`products`] - 商品与库存接口

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod cashbook;
pub mod clients;
pub mod day_statuses;
pub mod deliveries;
pub mod driver_days;
pub mod driver_expenses;
pub mod drivers;
pub mod health;
pub mod products;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(drivers::router())
        .merge(clients::router())
        .merge(deliveries::router())
        .merge(driver_expenses::router())
        .merge(day_statuses::router())
        .merge(driver_days::router())
        .merge(cashbook::router())
        .merge(products::router())
}

/// Build the application with all middleware applied
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the web frontend runs on its own origin
        .layer(CorsLayer::permissive())
        // Compression - gzip responses
        .layer(CompressionLayer::new())
        // Trace - request logging at INFO level
        .layer(TraceLayer::new_for_http())
        // Request ID - generate and propagate x-request-id
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
