//! # 房源目录服务
//!
//! 一个以单个 JSON 文件为后端的 HTTP+JSON 房源列表服务：
//! - `app::catalog`：房源模型、存储、接口、过滤统计与客户端状态
//! - `core`：统一错误处理与请求日志中间件
//! - `infrastructure`：JSON 快照文件与日志初始化
//! - `config`：环境变量配置

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

use axum::{middleware, response::Json, routing::get, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub use app::catalog::{
    handler::AppState, service::CatalogService, store::CatalogStore, ROUTE_PREFIX,
};
pub use config::AppConfig;
pub use infrastructure::json_file::{DocumentLayout, JsonFile, StoreError};

/// 组装完整的路由与中间件
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(app::catalog::routes())
        .layer(middleware::from_fn(
            core::middleware::request_logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// 健康检查
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
