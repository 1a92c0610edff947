//! Unified error handling for admin.
//!
//! Same shape as the storefront's: capture server-class errors to Sentry,
//! map to a status code, and answer with a client-safe JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use clementine_core::provider::StoreError;
use clementine_core::types::InvalidTransition;

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend operation failed.
    #[error("Backend error: {0}")]
    Store(#[from] StoreError),

    /// Order status change violated the transition graph.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request lacks a valid admin token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Store(
                    StoreError::Transport(_) | StoreError::Parse(_) | StoreError::RateLimited { .. }
                )
        )
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Rejected(_) | StoreError::InvalidTransition(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                StoreError::RateLimited { .. }
                | StoreError::Transport(_)
                | StoreError::Parse(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Transition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) => json!({"error": "Not found"}),
                StoreError::Rejected(msg) => json!({"error": msg}),
                StoreError::InvalidTransition(e) => json!({"error": e.to_string()}),
                StoreError::RateLimited { .. }
                | StoreError::Transport(_)
                | StoreError::Parse(_) => json!({"error": "External service error"}),
            },
            Self::Internal(_) => json!({"error": "Internal server error"}),
            other => json!({"error": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use clementine_core::OrderStatus;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("no token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::NotFound("order".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Transition(InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::Transport("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_transition_error_message() {
        let err = AppError::Transition(InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        });
        assert_eq!(
            err.to_string(),
            "invalid order status transition: delivered -> pending"
        );
    }
}
