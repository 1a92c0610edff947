//! Client for the external document backend.
//!
//! The backend is a managed document store with a REST surface: products
//! and orders live in collections, and the bundled auth service verifies
//! ID tokens. This client covers the public storefront surface only; the
//! admin binary carries its own client for the privileged endpoints.
//!
//! Product reads are cached with `moka` (5-minute TTL). Cart and order
//! state is never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use clementine_core::catalog::Product;
use clementine_core::order::{NewOrder, Order};
use clementine_core::provider::{AuthUser, CatalogSource, OrderStore, StoreError, TokenVerifier};
use clementine_core::{OrderId, ProductId, UserId};

use crate::config::BackendConfig;

/// How long catalog reads stay cached.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
}

/// Client for the document backend's public surface.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct DocstoreClient {
    inner: Arc<DocstoreClientInner>,
}

struct DocstoreClientInner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Cache<String, CacheValue>,
}

impl DocstoreClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &BackendConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(DocstoreClientInner {
                http,
                base_url: config.base_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
                cache,
            }),
        })
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
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
            return Err(StoreError::Rejected(truncate(&body, 200)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, 500),
                "Backend returned non-success status"
            );
            return Err(StoreError::Transport(format!("HTTP {status}")));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse backend response"
            );
            StoreError::Parse(e.to_string())
        })
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
}

/// Trim a response body for log output.
fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

#[async_trait]
impl CatalogSource for DocstoreClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let cache_key = "products".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("/v1/products").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("/v1/products/{id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

#[async_trait]
impl OrderStore for DocstoreClient {
    #[instrument(skip(self, order), fields(customer = %order.customer, total = %order.total_amount))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.post_json("/v1/orders", order).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.get_json(&format!("/v1/orders/{id}")).await
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, StoreError> {
        self.get_json(&format!("/v1/orders?customer={customer}"))
            .await
    }
}

#[async_trait]
impl TokenVerifier for DocstoreClient {
    #[instrument(skip(self, id_token))]
    async fn verify(&self, id_token: &str) -> Result<AuthUser, StoreError> {
        #[derive(Serialize)]
        struct VerifyRequest<'a> {
            id_token: &'a str,
        }

        self.post_json("/v1/auth/verify", &VerifyRequest { id_token })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
