//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::infrastructure::json_file::StoreError;

/// 核心错误类型
#[derive(Debug)]
pub enum CoreError {
    BadRequest(String),
    /// 校验失败的字段名（已排序）
    Validation(Vec<String>),
    NotFound(String),
    Storage(StoreError),
}

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err)
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, error_code, user_message) = match self {
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            CoreError::Validation(failed) => {
                let message = format!("invalid fields: {}", failed.join(", "));
                fields = Some(failed);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            CoreError::Storage(err) => {
                // 细节只写日志，不回传客户端
                error!("catalog storage failure: {}", err);
                let message = if err.is_write() {
                    "Error writing catalog"
                } else {
                    "Error reading catalog"
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    message.to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_code.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            fields,
        };

        (status, axum::Json(error_response)).into_response()
    }
}
