//! Application state shared across handlers.

use std::sync::Arc;

use clementine_core::provider::{CatalogSource, OrderStore, TokenVerifier};

use crate::backend::DocstoreClient;
use crate::config::StorefrontConfig;
use clementine_core::provider::StoreError;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The backend collaborators
/// are held as trait objects so tests can inject in-memory doubles instead
/// of the real document backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogSource>,
    orders: Arc<dyn OrderStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Create the production state: one backend client serving all three
    /// collaborator contracts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StoreError> {
        let client = DocstoreClient::new(&config.backend)?;

        Ok(Self::with_providers(
            config,
            Arc::new(client.clone()),
            Arc::new(client.clone()),
            Arc::new(client),
        ))
    }

    /// Create a state with explicit collaborators (used by tests).
    #[must_use]
    pub fn with_providers(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogSource>,
        orders: Arc<dyn OrderStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                orders,
                verifier,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the product catalog collaborator.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogSource {
        self.inner.catalog.as_ref()
    }

    /// Get the order persistence collaborator.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get the ID token verifier.
    #[must_use]
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.inner.verifier.as_ref()
    }
}
