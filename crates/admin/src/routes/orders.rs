//! Order management handlers.
//!
//! Status changes are validated against the order transition graph before
//! anything reaches the backend; an illegal move is a 422 with the typed
//! transition error, not a write.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use clementine_core::order::Order;
use clementine_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

/// List every order.
#[instrument(skip(_admin, state))]
pub async fn index(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = state.orders().list_orders().await?;
    Ok(Json(orders))
}

/// Show one order.
#[instrument(skip(_admin, state))]
pub async fn show(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = state.orders().get_order(&OrderId::new(id)).await?;
    Ok(Json(order))
}

/// Set an order's status.
///
/// The current status is read first and the move checked against the
/// transition graph; only legal transitions are written.
#[instrument(skip(_admin, state))]
pub async fn update_status(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    let id = OrderId::new(id);
    let order = state.orders().get_order(&id).await?;

    let next = order.status().transition_to(body.status)?;
    let updated = state.orders().update_status(&id, next).await?;

    Ok(Json(updated))
}

/// Delete an order outright.
#[instrument(skip(_admin, state))]
pub async fn delete(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.orders().delete_order(&OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
