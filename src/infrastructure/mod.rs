//! 基础设施层：持久化与日志

pub mod json_file;
pub mod logger;
