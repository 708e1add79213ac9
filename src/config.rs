//! 运行配置
//!
//! 全部来自环境变量，启动时若存在 `.env` 会先加载。

use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::infrastructure::json_file::DocumentLayout;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("CATALOG_LAYOUT must be `array` or `keyed`, got {0:?}")]
    InvalidLayout(String),

    #[error("CATALOG_REQUEST_TIMEOUT_SECS must be greater than 0")]
    ZeroTimeout,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub data_file: PathBuf,
    pub layout: DocumentLayout,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构造配置，方便测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let layout = match get("CATALOG_LAYOUT", "array").to_ascii_lowercase().as_str() {
            "array" => DocumentLayout::Array,
            "keyed" => DocumentLayout::Keyed {
                resource: get("CATALOG_RESOURCE", "properties"),
            },
            other => return Err(ConfigError::InvalidLayout(other.to_string())),
        };

        let server_port = parse_number("PORT", get("PORT", "5000"))?;
        let timeout_secs: u64 =
            parse_number("CATALOG_REQUEST_TIMEOUT_SECS", get("CATALOG_REQUEST_TIMEOUT_SECS", "10"))?;
        // 0 秒会让每个请求立即超时
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(AppConfig {
            server_host: get("CATALOG_HOST", "0.0.0.0"),
            server_port,
            data_file: PathBuf::from(get("CATALOG_DATA_FILE", "./data/properties.json")),
            layout,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level: get("CATALOG_LOG_LEVEL", "info"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse();
    parsed.map_err(|_| ConfigError::InvalidNumber { name, value })
}
