//! Admin authentication extractor.
//!
//! Every admin route requires `Authorization: Bearer <ADMIN_API_TOKEN>`.
//! The comparison is constant-time so the token cannot be probed byte by
//! byte through response timing.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn list(_admin: RequireAdminToken, State(state): State<AppState>) -> impl IntoResponse {
///     // only reached with a valid token
/// }
/// ```
pub struct RequireAdminToken;

/// Rejection returned when the token is missing or wrong.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Admin token required"})),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AdminAuthRejection)?;

        let expected = state.config().admin_token.expose_secret();

        // ct_eq is false for unequal lengths without leaking a timing
        // difference within equal-length comparisons
        if presented.as_bytes().ct_eq(expected.as_bytes()).into() {
            Ok(Self)
        } else {
            Err(AdminAuthRejection)
        }
    }
}
