//! Contracts for the external managed backend.
//!
//! Persistence, catalog storage, and identity all live in a third-party
//! document backend. The service crates implement these traits against its
//! HTTP API; tests implement them in memory. Keeping the traits here (and
//! dyn-safe) is what lets the cart and checkout logic be exercised without
//! a network anywhere in sight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{NewProduct, Product, ProductPatch};
use crate::order::{NewOrder, Order};
use crate::types::{Email, InvalidTransition, OrderId, OrderStatus, ProductId, UserId};

/// Errors surfaced by backend collaborators.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreError {
    /// The document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend asked us to slow down.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the backend asked us to wait.
        retry_after_secs: u64,
    },

    /// The request never completed (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with something we could not decode.
    #[error("malformed response: {0}")]
    Parse(String),

    /// The backend understood the request and refused it.
    #[error("rejected: {0}")]
    Rejected(String),

    /// A status change violated the order transition graph.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures and rate limits are transient; everything else
    /// will fail the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited { .. })
    }
}

/// A user as the external auth provider describes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub role: Role,
}

/// Access level granted by the auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the whole catalog.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Fetch one product.
    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order and return it with its backend-assigned id.
    ///
    /// At-most-once from this call's perspective; retrying is the caller's
    /// decision.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Fetch one order.
    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError>;

    /// Fetch all orders a customer has placed.
    async fn orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, StoreError>;
}

/// Admin-side order and catalog management.
#[async_trait]
pub trait OrderAdmin: Send + Sync {
    /// Fetch every order.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Fetch one order.
    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError>;

    /// Set an order's status. Implementations validate the transition
    /// graph before writing.
    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, StoreError>;

    /// Delete an order outright.
    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError>;
}

/// Admin-side catalog management.
#[async_trait]
pub trait CatalogAdmin: Send + Sync {
    /// Create a product; the backend assigns id and creation timestamp.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update to a product.
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError>;

    /// Delete a product.
    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError>;
}

/// Verification of the auth provider's ID tokens.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Exchange an opaque ID token for the user it belongs to.
    async fn verify(&self, id_token: &str) -> Result<AuthUser, StoreError>;
}
