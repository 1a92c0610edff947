//! Cart route handlers.
//!
//! The cart lives in the session. Adding a product snapshots its name,
//! price, and image from the catalog at add time; totals are derived by
//! the core cart and never sent by the client.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use clementine_core::ProductId;
use clementine_core::cart::Cart;

use crate::error::Result;
use crate::models::session_keys;
use crate::state::AppState;

/// Load the session's cart, or an empty one.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: String,
    /// Defaults to 1.
    pub quantity: Option<u32>,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityBody {
    pub quantity: u32,
}

/// Show the cart with its derived totals.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<Cart>> {
    Ok(Json(load_cart(&session).await?))
}

/// Add a product to the cart.
///
/// Fetches the product so the cart line carries a snapshot of its current
/// name and price. Adding an already-carted product increases its
/// quantity.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemBody>,
) -> Result<Json<Cart>> {
    let product = state
        .catalog()
        .get_product(&ProductId::new(body.product_id))
        .await?;

    let mut cart = load_cart(&session).await?;
    cart.add_item(&product, body.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    Ok(Json(cart))
}

/// Set a cart line's quantity. Zero removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(id): Path<String>,
    Json(body): Json<SetQuantityBody>,
) -> Result<Json<Cart>> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(&ProductId::new(id), body.quantity);
    save_cart(&session, &cart).await?;

    Ok(Json(cart))
}

/// Remove a cart line. A no-op when the product is not in the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<String>) -> Result<Json<Cart>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(&ProductId::new(id));
    save_cart(&session, &cart).await?;

    Ok(Json(cart))
}

/// Total quantity for the cart badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<Value>> {
    let cart = load_cart(&session).await?;
    Ok(Json(json!({ "count": cart.total_quantity() })))
}
