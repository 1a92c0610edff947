//! Middleware for the admin service.

pub mod auth;

pub use auth::RequireAdminToken;
