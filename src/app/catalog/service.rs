//! 房源业务服务

use tracing::debug;
use validator::Validate;

use super::{
    filter::{CatalogSummary, PropertyFilter},
    model::{PropertyInput, PropertyRecord},
    store::CatalogStore,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct CatalogService {
    store: CatalogStore,
}

impl CatalogService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PropertyRecord>, CoreError> {
        let records = self.store.load().await?;
        if filter.is_identity() {
            return Ok(records);
        }
        let filtered = filter.apply(&records);
        debug!("filter {:?} kept {} of {}", filter, filtered.len(), records.len());
        Ok(filtered)
    }

    pub async fn get(&self, id: u64) -> Result<PropertyRecord, CoreError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("property {} not found", id)))
    }

    pub async fn create(&self, input: PropertyInput) -> Result<PropertyRecord, CoreError> {
        input.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .into_keys()
                .map(|field| PropertyInput::wire_field_name(&field).to_string())
                .collect();
            fields.sort();
            CoreError::Validation(fields)
        })?;
        Ok(self.store.append(input).await?)
    }

    pub async fn summary(&self) -> Result<CatalogSummary, CoreError> {
        Ok(CatalogSummary::of(&self.store.load().await?))
    }
}
