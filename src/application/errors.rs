use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::domain::{RepositoryError, ValidationError};

/// Message shown to clients for failures they cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "服务器内部错误";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

/// Body of every failed response: the envelope with a `null` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub msg: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(message) | AppError::Conflict(message) => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            AppError::Unauthorized(message) => Self::new(StatusCode::UNAUTHORIZED, message),
            AppError::Repository(RepositoryError::NotFound) => {
                Self::new(StatusCode::NOT_FOUND, "资源不存在")
            }
            AppError::Repository(RepositoryError::Conflict(message)) => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            AppError::Repository(RepositoryError::Unexpected(message))
            | AppError::Unexpected(message) => {
                error!(error = %message, "request failed with an unexpected error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        AppError::from(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        AppError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.status.as_u16(),
            msg: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}
