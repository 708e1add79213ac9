//! 客户端仪表盘状态
//!
//! 状态只通过 [`DashboardState::apply`] 改变：store → view → intent → store。

use super::filter::{distinct_types, CatalogSummary, PropertyFilter};
use super::model::PropertyRecord;

/// 用户或网络触发的状态变化
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    FetchStarted,
    Loaded(Vec<PropertyRecord>),
    /// 拉取失败：保留已有列表
    LoadFailed,
    SearchChanged(String),
    TypeSelected(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub records: Vec<PropertyRecord>,
    pub filter: PropertyFilter,
    pub loading: bool,
}

impl DashboardState {
    pub fn apply(mut self, intent: Intent) -> Self {
        match intent {
            Intent::FetchStarted => self.loading = true,
            Intent::Loaded(records) => {
                self.records = records;
                self.loading = false;
            }
            Intent::LoadFailed => self.loading = false,
            Intent::SearchChanged(text) => self.filter.search = text,
            Intent::TypeSelected(kind) => self.filter.kind = kind,
        }
        self
    }

    /// 当前过滤条件下可见的房源
    pub fn visible(&self) -> Vec<PropertyRecord> {
        self.filter.apply(&self.records)
    }

    pub fn type_options(&self) -> Vec<String> {
        distinct_types(&self.records)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary::of(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::model::PropertyInput;

    fn records() -> Vec<PropertyRecord> {
        [("Lake House", "Pune", "Villa"), ("City Flat", "Mumbai", "Apartment")]
            .iter()
            .enumerate()
            .map(|(i, (name, location, kind))| {
                PropertyRecord::from_input(
                    i as u64 + 1,
                    PropertyInput {
                        name: name.to_string(),
                        kind: kind.to_string(),
                        price: Some(1.0),
                        location: location.to_string(),
                        description: String::new(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn failed_load_keeps_previous_records() {
        let state = DashboardState::default()
            .apply(Intent::FetchStarted)
            .apply(Intent::Loaded(records()))
            .apply(Intent::FetchStarted);
        assert!(state.loading);

        let state = state.apply(Intent::LoadFailed);
        assert!(!state.loading);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn intents_drive_the_visible_list() {
        let state = DashboardState::default().apply(Intent::Loaded(records()));
        assert_eq!(state.visible().len(), 2);

        let state = state.apply(Intent::SearchChanged("LAKE".into()));
        assert_eq!(state.visible()[0].name, "Lake House");

        let state = state
            .apply(Intent::SearchChanged(String::new()))
            .apply(Intent::TypeSelected("Apartment".into()));
        let visible = state.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].location, "Mumbai");
    }

    #[test]
    fn type_options_follow_records() {
        let state = DashboardState::default();
        assert_eq!(state.type_options(), vec!["All".to_string()]);
        assert_eq!(state.summary().average_price, 0);

        let state = state.apply(Intent::Loaded(records()));
        assert_eq!(state.type_options().len(), 3);
        assert_eq!(state.summary().total, 2);
    }
}
