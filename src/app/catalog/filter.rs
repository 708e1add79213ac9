//! 列表过滤与统计

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::model::PropertyRecord;

/// 类型下拉框里表示"不过滤"的选项
pub const ALL_TYPES: &str = "All";

/// 类型 + 关键字过滤条件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertyFilter {
    #[serde(rename = "type", default = "all_types")]
    pub kind: String,
    #[serde(default)]
    pub search: String,
}

fn all_types() -> String {
    ALL_TYPES.to_string()
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            kind: all_types(),
            search: String::new(),
        }
    }
}

impl PropertyFilter {
    pub fn new(kind: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            search: search.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind == ALL_TYPES && self.search.trim().is_empty()
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        if self.kind != ALL_TYPES && record.kind != self.kind {
            return false;
        }
        let text = self.search.trim().to_lowercase();
        if text.is_empty() {
            return true;
        }
        record.name.to_lowercase().contains(&text) || record.location.to_lowercase().contains(&text)
    }

    pub fn apply(&self, records: &[PropertyRecord]) -> Vec<PropertyRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// `"All"` 加上当前出现过的所有类型；`"All"` 之后的顺序不固定
pub fn distinct_types(records: &[PropertyRecord]) -> Vec<String> {
    let set: HashSet<&str> = records.iter().map(|r| r.kind.as_str()).collect();
    std::iter::once(ALL_TYPES.to_string())
        .chain(set.into_iter().map(str::to_string))
        .collect()
}

/// 仪表盘统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub average_price: i64,
    pub locations: usize,
    pub types: Vec<String>,
}

impl CatalogSummary {
    pub fn of(records: &[PropertyRecord]) -> Self {
        Self {
            total: records.len(),
            average_price: average_price(records),
            locations: records
                .iter()
                .map(|r| r.location.as_str())
                .collect::<HashSet<_>>()
                .len(),
            types: distinct_types(records),
        }
    }
}

/// 价格均值，四舍五入到整数；空集合为 0
pub fn average_price(records: &[PropertyRecord]) -> i64 {
    if records.is_empty() {
        return 0;
    }
    let sum: f64 = records.iter().map(|r| r.price).sum();
    (sum / records.len() as f64).round() as i64
}
