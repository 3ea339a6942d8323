//! Error types for the Bookshelf server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    Duplicate = 5,
    BadValue = 6,
    NotEnoughStock = 7,
    ExcessReturn = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not enough books in stock to lend.")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("You cannot return more books than borrowed!")]
    ExcessReturn { borrowed: i32, returned: i32 },
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::InsufficientStock { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::NotEnoughStock,
                self.to_string(),
            ),
            AppError::ExcessReturn { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ExcessReturn,
                self.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
