//! Application state shared across handlers.

use std::sync::Arc;

use clementine_core::provider::{CatalogAdmin, OrderAdmin, StoreError};

use crate::backend::AdminClient;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Collaborators are trait objects so tests
/// can inject in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    orders: Arc<dyn OrderAdmin>,
    catalog: Arc<dyn CatalogAdmin>,
}

impl AppState {
    /// Create the production state: one backend client serving both
    /// collaborator contracts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, StoreError> {
        let client = AdminClient::new(&config)?;

        Ok(Self::with_providers(
            config,
            Arc::new(client.clone()),
            Arc::new(client),
        ))
    }

    /// Create a state with explicit collaborators (used by tests).
    #[must_use]
    pub fn with_providers(
        config: AdminConfig,
        orders: Arc<dyn OrderAdmin>,
        catalog: Arc<dyn CatalogAdmin>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders,
                catalog,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the order management collaborator.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderAdmin {
        self.inner.orders.as_ref()
    }

    /// Get the catalog management collaborator.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogAdmin {
        self.inner.catalog.as_ref()
    }
}
