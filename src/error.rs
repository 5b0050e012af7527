//! Error types / 错误类型
//!
//! - `ValidationError`: bad client input, returned as 400
//! - `SearchError`: the Everything backend failed, returned as 500
//! - `FieldError`: one record or field could not be read, always recovered locally
//! - `ApiError`: what the HTTP layer turns into `{"error": "..."}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Query parameter validation failure / 查询参数校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing query parameter 'q'")]
    MissingQuery,

    #[error("Total length of search terms must be at least 3 characters. Current length: {length}")]
    QueryTooShort { length: usize },

    /// `limit` is not an integer
    #[error("Invalid limit parameter")]
    InvalidLimit,

    /// `limit` parsed but is zero or negative
    #[error("Limit must be a positive integer")]
    LimitNotPositive,
}

/// Search execution failure / 搜索执行失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Everything reported a failed query; carries its diagnostic
    #[error("Search failed: {0}")]
    Backend(String),
}

/// A single candidate or field could not be extracted / 单条结果或字段读取失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// HTTP-facing error / 接口错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Search(#[from] SearchError),

    /// Malformed query string
    #[error("{0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Search(e) => tracing::error!("{}", e),
            Self::Internal(detail) => tracing::error!("Server error: {}", detail),
            _ => {}
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
