//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the backend)
//!
//! # Catalog
//! GET  /products               - Product listing (?category=&min_price=&max_price=&sort=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (session-scoped)
//! GET    /cart                 - Cart with derived totals
//! POST   /cart/items           - Add a product ({product_id, quantity})
//! PATCH  /cart/items/{id}      - Set a line's quantity (0 removes)
//! DELETE /cart/items/{id}      - Remove a line
//! GET    /cart/count           - Total quantity badge
//!
//! # Checkout wizard (session-scoped)
//! GET  /checkout               - Current step, draft, and prefill
//! POST /checkout/personal      - Submit step 1
//! POST /checkout/shipping      - Submit step 2
//! POST /checkout/payment       - Submit step 3 and place the order
//! POST /checkout/back          - Go back one step
//!
//! # Auth (delegated to the external provider)
//! POST   /auth/session         - Verify an ID token and sign in
//! DELETE /auth/session         - Sign out
//!
//! # Orders
//! GET  /orders                 - Current user's order history
//! GET  /orders/{id}            - Order read-back (owner or placing session)
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/personal", post(checkout::submit_personal))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/payment", post(checkout::submit_payment))
        .route("/back", post(checkout::back))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/session",
        post(auth::sign_in).delete(auth::sign_out),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
}
