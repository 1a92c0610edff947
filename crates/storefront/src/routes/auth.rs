//! Auth route handlers.
//!
//! Authentication itself is the external provider's job. The storefront
//! accepts the provider's ID token, verifies it through the backend, and
//! keeps the resulting user in the session for prefill and order tagging.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use clementine_core::provider::AuthUser;

use crate::error::Result;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::state::AppState;

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInBody {
    /// ID token issued by the external auth provider.
    pub id_token: String,
}

/// Verify an ID token and store the user in the session.
#[instrument(skip(state, session, body))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignInBody>,
) -> Result<Json<AuthUser>> {
    let user = state.verifier().verify(&body.id_token).await?;
    set_current_user(&session, &user).await?;

    Ok(Json(user))
}

/// Drop the user from the session. The cart survives sign-out.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
