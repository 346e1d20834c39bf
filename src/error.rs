//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{DomainError, FieldError};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error("Car not found: {0}")]
    CarNotFound(Uuid),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification every caller can rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input was wrong; correct it and resubmit
    Validation,
    /// The store cannot afford the car
    InsufficientBudget,
    /// A referenced store or car does not exist
    NotFound,
    /// The system could not complete the operation; nothing was written
    Persistence,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidRequest(_) => ErrorKind::Validation,
            AppError::StoreNotFound(_) | AppError::CarNotFound(_) => ErrorKind::NotFound,
            AppError::Domain(DomainError::InsufficientBudget { .. }) => {
                ErrorKind::InsufficientBudget
            }
            AppError::Domain(_) => ErrorKind::Validation,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Persistence,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;

        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::StoreNotFound(id) => {
                (StatusCode::NOT_FOUND, "store_not_found", Some(id.to_string()))
            }
            AppError::CarNotFound(id) => {
                (StatusCode::NOT_FOUND, "car_not_found", Some(id.to_string()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InsufficientBudget { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_budget",
                    Some(domain_err.to_string()),
                ),
                DomainError::BudgetOverflow { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "budget_overflow",
                    Some(domain_err.to_string()),
                ),
                DomainError::InvalidFields(errors) => {
                    fields = Some(errors.clone());
                    (StatusCode::BAD_REQUEST, "validation_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        // Driver messages stay in the logs
        let error = match self.kind() {
            ErrorKind::Persistence => {
                "The operation could not be completed. Nothing was changed.".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            kind: self.kind(),
            details,
            fields,
        };

        (status, Json(body)).into_response()
    }
}
