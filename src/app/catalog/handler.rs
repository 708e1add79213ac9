//! 房源处理器

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};

use super::{
    filter::{CatalogSummary, PropertyFilter, ALL_TYPES},
    model::{PropertyInput, PropertyRecord},
    service::CatalogService,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }
}

/// GET /api/properties?type=&search=
pub async fn list_properties(
    State(state): State<AppState>,
    query: Result<Query<PropertyFilter>, QueryRejection>,
) -> Result<Json<Vec<PropertyRecord>>, CoreError> {
    let Query(mut filter) = query.map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;
    // `?type=` 与不带参数等价
    if filter.kind.trim().is_empty() {
        filter.kind = ALL_TYPES.to_string();
    }
    let records = state.catalog.list(&filter).await?;
    Ok(Json(records))
}

pub async fn get_property(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<PropertyRecord>, CoreError> {
    let Path(id) = id.map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;
    let record = state.catalog.get(id).await?;
    Ok(Json(record))
}

pub async fn create_property(
    State(state): State<AppState>,
    payload: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyRecord>), CoreError> {
    let Json(input) = payload.map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;
    let record = state.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn catalog_summary(
    State(state): State<AppState>,
) -> Result<Json<CatalogSummary>, CoreError> {
    let summary = state.catalog.summary().await?;
    Ok(Json(summary))
}
