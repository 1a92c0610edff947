//! Session-backed models for the storefront.
//!
//! All durable data lives in the document backend; the only state the
//! storefront itself keeps is per-session: the cart, the in-progress
//! checkout, the verified user, and the id of the last order the session
//! placed (so guests can read their confirmation back).

/// Keys under which session state is stored.
pub mod session_keys {
    /// The session's [`Cart`](clementine_core::cart::Cart).
    pub const CART: &str = "cart";
    /// The session's [`CheckoutFlow`](clementine_core::checkout::CheckoutFlow).
    pub const CHECKOUT: &str = "checkout";
    /// The verified [`AuthUser`](clementine_core::provider::AuthUser).
    pub const CURRENT_USER: &str = "current_user";
    /// Id of the most recent order this session placed.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}
