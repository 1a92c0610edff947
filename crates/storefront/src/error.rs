//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses are JSON: `{"error": "..."}`, with a `fields` array for
//! validation failures so the client can render messages inline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use clementine_core::checkout::CheckoutError;
use clementine_core::provider::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend operation failed.
    #[error("Backend error: {0}")]
    Store(#[from] StoreError),

    /// Checkout wizard rejected the request.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Internal(_)
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
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::EmptyCart
                | CheckoutError::OutOfOrder
                | CheckoutError::Incomplete => StatusCode::CONFLICT,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
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
                "Request error"
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
                | StoreError::Parse(_) => {
                    json!({"error": "External service error", "retryable": true})
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(errors) => {
                    json!({"error": "Validation failed", "fields": errors})
                }
                CheckoutError::EmptyCart => {
                    json!({"error": "Your cart is empty", "redirect": "/products"})
                }
                other => json!({"error": other.to_string()}),
            },
            Self::Session(_) | Self::Internal(_) => json!({"error": "Internal server error"}),
            other => json!({"error": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
