//! HTTP route handlers for the admin service.
//!
//! Every route requires the admin bearer token.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//!
//! # Orders
//! GET    /orders                - All orders
//! GET    /orders/{id}           - Order detail
//! PATCH  /orders/{id}/status    - Set order status (validated transition)
//! DELETE /orders/{id}           - Delete an order
//!
//! # Products
//! POST   /products              - Create a product
//! PATCH  /products/{id}         - Partially update a product
//! DELETE /products/{id}         - Delete a product
//! ```

pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the order management router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show).delete(orders::delete))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create the product management router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create))
        .route(
            "/{id}",
            patch(products::update).delete(products::delete),
        )
}

/// Create all routes for the admin service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
}
