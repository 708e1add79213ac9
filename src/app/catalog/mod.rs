//! 房源目录：存储、接口、过滤统计与客户端状态

pub mod filter;
pub mod handler;
pub mod model;
pub mod service;
pub mod store;
pub mod view;

use axum::{routing::get, Router};

use handler::{catalog_summary, create_property, get_property, list_properties, AppState};

/// 房源资源的统一前缀
pub const ROUTE_PREFIX: &str = "/api/properties";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(ROUTE_PREFIX, get(list_properties).post(create_property))
        .route("/api/properties/summary", get(catalog_summary))
        .route("/api/properties/:id", get(get_property))
}
