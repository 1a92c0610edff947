//! Checkout route handlers.
//!
//! The wizard state lives in the session; each POST submits one step to
//! the core [`CheckoutFlow`]. Validation failures come back as 422 with
//! field-keyed messages and leave the flow where it was. The final payment
//! step places the order through the retrying submission service; a
//! backend failure preserves both cart and draft so the customer can
//! simply retry.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use clementine_core::checkout::{
    CardDetails, CheckoutError, CheckoutFlow, CheckoutStep, PaymentDetails, PersonalInfo,
    ShippingInfo, format,
};
use clementine_core::order::Order;
use clementine_core::types::{OrderId, PaymentMethod, UserId};

use crate::error::Result;
use crate::middleware::OptionalUser;
use crate::models::session_keys;
use crate::routes::cart::{load_cart, save_cart};
use crate::services::orders::submit_with_retry;
use crate::state::AppState;

/// Load the session's checkout flow, or start a fresh one.
async fn load_flow(session: &Session) -> Result<CheckoutFlow> {
    Ok(session
        .get::<CheckoutFlow>(session_keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

/// Write the checkout flow back to the session.
async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session.insert(session_keys::CHECKOUT, flow).await?;
    Ok(())
}

/// Suggested initial values for the personal-info form, taken from the
/// signed-in user.
#[derive(Debug, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
}

/// What `GET /checkout` returns.
///
/// Card details never leave the session; only the chosen method is echoed.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub personal: Option<PersonalInfo>,
    pub shipping: Option<ShippingInfo>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill: Option<Prefill>,
}

/// Payment step request body.
#[derive(Debug, Deserialize)]
pub struct PaymentBody {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card: Option<CardBody>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Raw card fields as typed by the customer.
#[derive(Debug, Deserialize)]
pub struct CardBody {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

impl CardBody {
    /// Run the live input masks over the raw fields, the same
    /// normalization the form applies on every keystroke.
    fn into_details(self) -> CardDetails {
        CardDetails {
            number: format::format_card_number(&self.number),
            expiry: format::format_card_expiry(&self.expiry),
            cvv: format::format_card_cvv(&self.cvv),
            holder_name: self.holder_name,
        }
    }
}

/// Show the wizard's current step and committed draft.
///
/// Entering checkout with an empty cart is a 409 pointing the client back
/// to browsing.
#[instrument(skip(session, user))]
pub async fn show(
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Json<CheckoutView>> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }

    let flow = load_flow(&session).await?;
    let draft = flow.draft();

    // Offer the signed-in user's details until step 1 is committed.
    let prefill = match (&draft.personal, &user) {
        (None, Some(user)) => Some(Prefill {
            name: user.display_name.clone(),
            email: user.email.to_string(),
        }),
        _ => None,
    };

    Ok(Json(CheckoutView {
        step: flow.step(),
        personal: draft.personal.clone(),
        shipping: draft.shipping.clone(),
        payment_method: draft.payment.as_ref().map(|p| p.method),
        notes: draft.notes.clone(),
        prefill,
    }))
}

/// Submit the personal-info step.
#[instrument(skip(session, info))]
pub async fn submit_personal(
    session: Session,
    Json(info): Json<PersonalInfo>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    flow.submit_personal(info)?;
    save_flow(&session, &flow).await?;

    Ok(step_response(&flow))
}

/// Submit the shipping-info step.
#[instrument(skip(session, info))]
pub async fn submit_shipping(
    session: Session,
    Json(info): Json<ShippingInfo>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    flow.submit_shipping(info)?;
    save_flow(&session, &flow).await?;

    Ok(step_response(&flow))
}

/// Submit the payment step and place the order.
///
/// On success the cart is cleared, the wizard is dropped, and the session
/// remembers the order id so a guest can read the confirmation back. On a
/// backend failure everything stays put for a retry.
#[instrument(skip(state, session, user, body))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Json(body): Json<PaymentBody>,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }

    let details = PaymentDetails {
        method: body.method,
        card: body.card.map(CardBody::into_details),
    };

    let mut flow = load_flow(&session).await?;
    flow.submit_payment(details, body.notes)?;
    // Committed payment data survives a failed backend call below.
    save_flow(&session, &flow).await?;

    let customer = user.as_ref().map_or_else(UserId::guest, |u| u.id.clone());
    let new_order = flow.finalize(&cart, customer, Utc::now())?;

    let order = submit_with_retry(state.orders(), &new_order, &state.config().order_submit).await?;

    finish_checkout(&session, &order).await?;

    Ok((StatusCode::CREATED, Json(order)).into_response())
}

/// Go back one step. Never discards entered data.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    flow.back();
    save_flow(&session, &flow).await?;

    Ok(step_response(&flow))
}

/// Clear the order-producing session state after a successful placement.
async fn finish_checkout(session: &Session, order: &Order) -> Result<()> {
    save_cart(session, &clementine_core::cart::Cart::new()).await?;
    session
        .remove::<CheckoutFlow>(session_keys::CHECKOUT)
        .await?;
    session
        .insert(session_keys::LAST_ORDER_ID, &order.id)
        .await?;
    Ok(())
}

/// Read back the id of the order this session last placed, if any.
pub(crate) async fn last_order_id(session: &Session) -> Option<OrderId> {
    session
        .get::<OrderId>(session_keys::LAST_ORDER_ID)
        .await
        .ok()
        .flatten()
}

fn step_response(flow: &CheckoutFlow) -> Response {
    Json(json!({ "step": flow.step() })).into_response()
}
