//! Order route handlers.
//!
//! Read paths only; orders are created by the checkout wizard and mutated
//! by the admin service. A guest may read back exactly the order their
//! session placed; signed-in users see their own orders.

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use clementine_core::OrderId;
use clementine_core::order::Order;

use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireUser};
use crate::routes::checkout::last_order_id;
use crate::state::AppState;

/// Order history for the signed-in user.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = state.orders().orders_for_customer(&user.id).await?;
    Ok(Json(orders))
}

/// Read back one order.
///
/// Allowed for the order's owner, or for the session that just placed it
/// (the guest confirmation path). Anything else is a 404 - not a 403 - so
/// order ids stay unguessable.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id = OrderId::new(id);
    let order = state.orders().get_order(&id).await?;

    let owned = user
        .as_ref()
        .is_some_and(|u| order.is_owned_by(&u.id));
    let placed_here = last_order_id(&session).await.as_ref() == Some(&id);

    if owned || placed_here {
        Ok(Json(order))
    } else {
        Err(AppError::NotFound(format!("order {id}")))
    }
}
