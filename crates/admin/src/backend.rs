//! Client for the document backend's privileged surface.
//!
//! Separate from the storefront's client on purpose: this one carries the
//! privileged API key and reaches the mutation endpoints (order status,
//! order deletion, product CRUD). Admin reads are never cached - the
//! back-office must see the backend's current state.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use clementine_core::catalog::{NewProduct, Product, ProductPatch};
use clementine_core::order::Order;
use clementine_core::provider::{CatalogAdmin, OrderAdmin, StoreError};
use clementine_core::{OrderId, OrderStatus, ProductId};

use crate::config::AdminConfig;

/// Client for the backend's admin surface.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AdminClient {
    /// Create a new admin backend client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &AdminConfig) -> Result<Self, StoreError> {
        Self::from_parts(
            config.backend_base_url.clone(),
            &config.backend_api_key,
            config.backend_timeout,
        )
    }

    /// Create a client from raw connection parts (used by the CLI, which
    /// has no server config).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn from_parts(
        base_url: String,
        api_key: &secrecy::SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.expose_secret().to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request
            .header("X-Api-Key", &self.inner.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound("document not found".to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if status.is_client_error() {
            return Err(StoreError::Rejected(
                body.chars().take(200).collect::<String>(),
            ));
        }

        if !status.is_success() {
            tracing::error!(status = %status, "Backend returned non-success status");
            return Err(StoreError::Transport(format!("HTTP {status}")));
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Execute a request where the response body does not matter.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let response = request
            .header("X-Api-Key", &self.inner.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound("document not found".to_string()));
        }

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(
                body.chars().take(200).collect::<String>(),
            ));
        }

        if !status.is_success() {
            return Err(StoreError::Transport(format!("HTTP {status}")));
        }

        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        self.execute(self.inner.http.get(self.url(path))).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        self.execute(self.inner.http.post(self.url(path)).json(body))
            .await
    }

    async fn patch_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        self.execute(self.inner.http.patch(self.url(path)).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.execute_empty(self.inner.http.delete(self.url(path)))
            .await
    }
}

#[async_trait]
impl OrderAdmin for AdminClient {
    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.get_json("/v1/orders").await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.get_json(&format!("/v1/orders/{id}")).await
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        #[derive(Serialize)]
        struct StatusPatch {
            status: OrderStatus,
        }

        self.patch_json(&format!("/v1/orders/{id}"), &StatusPatch { status })
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        self.delete(&format!("/v1/orders/{id}")).await
    }
}

#[async_trait]
impl CatalogAdmin for AdminClient {
    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        self.post_json("/v1/products", product).await
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        self.patch_json(&format!("/v1/products/{id}"), patch).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        self.delete(&format!("/v1/products/{id}")).await
    }
}
