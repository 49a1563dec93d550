//! Error handling for the Bakery Inventory Platform
//!
//! Every failure reaches the client as `{"error": {"code", "message", "field"}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::InventoryError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathRejection),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound { entity, key } => {
                AppError::NotFound(format!("{} '{}'", entity, key))
            }
            InventoryError::InvalidState(msg) => AppError::InvalidState(msg),
            InventoryError::InsufficientStock(msg) => AppError::InsufficientStock(msg),
            InventoryError::Validation { field, message } => AppError::Validation {
                field: field.to_string(),
                message,
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. }
            | AppError::InvalidInput(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidPath(_)
            | AppError::Conflict { .. }
            | AppError::InvalidState(_)
            | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message, field) = match self {
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()))
            }
            AppError::InvalidInput(errors) => (
                "VALIDATION_ERROR",
                errors.to_string(),
                errors.errors().keys().next().map(|k| k.to_string()),
            ),
            AppError::InvalidBody(rejection) => ("VALIDATION_ERROR", rejection.body_text(), None),
            AppError::InvalidPath(rejection) => ("VALIDATION_ERROR", rejection.body_text(), None),
            AppError::Conflict { resource, message } => {
                ("CONFLICT", message.clone(), Some(resource.clone()))
            }
            AppError::NotFound(resource) => ("NOT_FOUND", format!("{} not found", resource), None),
            AppError::InvalidState(msg) => ("INVALID_STATE", msg.clone(), None),
            AppError::InsufficientStock(msg) => ("INSUFFICIENT_STOCK", msg.clone(), None),
            AppError::DatabaseError(_) => {
                ("DATABASE_ERROR", "A database error occurred".to_string(), None)
            }
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
            AppError::InternalError(_) => (
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
            ),
        };

        ErrorDetail {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// True when a write hit a unique constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_inventory_errors_map_to_statuses() {
        let cases = [
            (InventoryError::not_found("Product", "42"), StatusCode::NOT_FOUND),
            (
                InventoryError::InvalidState("no recipe".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::InsufficientStock("short".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::Validation {
                    field: "quantity",
                    message: "must be positive".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = AppError::from(InventoryError::not_found("Stock item", "Sal"));
        let detail = err.detail();
        assert_eq!(detail.code, "NOT_FOUND");
        assert_eq!(detail.message, "Stock item 'Sal' not found");
    }

    #[test]
    fn test_conflict_is_bad_request() {
        let err = AppError::Conflict {
            resource: "stock_item".into(),
            message: "A stock item named 'Harina' already exists".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail().field.as_deref(), Some("stock_item"));
    }

    #[test]
    fn test_validation_errors_report_field() {
        let input = shared::PrepareRequest { quantity: 0.0 };
        let err = AppError::from(input.validate().unwrap_err());
        let detail = err.detail();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("quantity"));
    }

    #[test]
    fn test_database_error_is_hidden() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail().message, "A database error occurred");
    }
}
