//! Integration test harness for Clementine.
//!
//! The external document backend is the one seam both services share, so
//! the harness implements every collaborator contract in memory and builds
//! the real storefront and admin routers around it. Tests drive the
//! routers in-process with `tower::ServiceExt::oneshot`; no network, no
//! external services.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Session cart API
//! - `storefront_checkout` - Checkout wizard, order placement, read-back
//! - `admin_orders` - Back-office order and product management

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use clementine_core::catalog::{Category, NewProduct, Product, ProductPatch};
use clementine_core::order::{NewOrder, Order};
use clementine_core::provider::{
    AuthUser, CatalogAdmin, CatalogSource, OrderAdmin, OrderStore, Role, StoreError, TokenVerifier,
};
use clementine_core::{Email, OrderId, OrderStatus, ProductId, UserId};

/// Admin bearer token used by the test admin router.
pub const ADMIN_TOKEN: &str = "integration-test-admin-token-0123456789";

/// In-memory stand-in for the document backend.
///
/// Implements every collaborator contract. `fail_next_order_creates`
/// makes the next N order writes fail with a transport error, for
/// exercising the submission retry path.
#[derive(Default)]
pub struct MemoryBackend {
    products: Mutex<Vec<Product>>,
    orders: Mutex<Vec<Order>>,
    users: Mutex<HashMap<String, AuthUser>>,
    next_order_id: AtomicU32,
    order_create_failures: AtomicU32,
    order_create_calls: AtomicU32,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.products.lock().expect("lock").push(product);
    }

    /// Register an ID token the verifier will accept.
    pub fn add_user(&self, id_token: &str, user: AuthUser) {
        self.users
            .lock()
            .expect("lock")
            .insert(id_token.to_owned(), user);
    }

    /// Make the next `n` order creations fail with a transport error.
    pub fn fail_next_order_creates(&self, n: u32) {
        self.order_create_failures.store(n, Ordering::SeqCst);
    }

    /// How many order creations were attempted.
    #[must_use]
    pub fn order_create_calls(&self) -> u32 {
        self.order_create_calls.load(Ordering::SeqCst)
    }

    /// Number of stored orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.lock().expect("lock").len()
    }
}

#[async_trait]
impl CatalogSource for MemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.lock().expect("lock").clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.products
            .lock()
            .expect("lock")
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("products/{id}")))
    }
}

#[async_trait]
impl OrderStore for MemoryBackend {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.order_create_calls.fetch_add(1, Ordering::SeqCst);

        let failures = self.order_create_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.order_create_failures
                .store(failures - 1, Ordering::SeqCst);
            return Err(StoreError::Transport("connection reset".to_owned()));
        }

        let n = self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Order {
            id: OrderId::new(format!("ord-{n}")),
            order: order.clone(),
        };
        self.orders.lock().expect("lock").push(stored.clone());
        Ok(stored)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.orders
            .lock()
            .expect("lock")
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("orders/{id}")))
    }

    async fn orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .iter()
            .filter(|o| &o.order.customer == customer)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderAdmin for MemoryBackend {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.lock().expect("lock").clone())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        OrderStore::get_order(self, id).await
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        let mut orders = self.orders.lock().expect("lock");
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("orders/{id}")))?;
        order.order.status = status;
        Ok(order.clone())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().expect("lock");
        let before = orders.len();
        orders.retain(|o| &o.id != id);
        if orders.len() == before {
            return Err(StoreError::NotFound(format!("orders/{id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogAdmin for MemoryBackend {
    async fn create_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.lock().expect("lock");
        let created = Product {
            id: ProductId::new(format!("p-{}", products.len() + 1)),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category,
            image_url: product.image_url.clone(),
            created_at: Utc::now(),
        };
        products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut products = self.products.lock().expect("lock");
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("products/{id}")))?;

        if let Some(name) = &patch.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            product.description.clone_from(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(image_url) = &patch.image_url {
            product.image_url.clone_from(image_url);
        }

        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        let mut products = self.products.lock().expect("lock");
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Err(StoreError::NotFound(format!("products/{id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for MemoryBackend {
    async fn verify(&self, id_token: &str) -> Result<AuthUser, StoreError> {
        self.users
            .lock()
            .expect("lock")
            .get(id_token)
            .cloned()
            .ok_or_else(|| StoreError::Rejected("invalid id token".to_owned()))
    }
}

/// A catalog product for seeding.
#[must_use]
pub fn sample_product(id: &str, category: Category, price: &str, days_ago: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("Description for {id}"),
        price: price.parse::<Decimal>().expect("valid decimal"),
        category,
        image_url: format!("https://cdn.example.com/{id}.jpg"),
        created_at: Utc::now() - chrono::Duration::days(days_ago),
    }
}

/// A verified user for seeding.
#[must_use]
pub fn sample_user(id: &str, email: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(id),
        email: Email::parse(email).expect("valid email"),
        display_name: format!("User {id}"),
        role: Role::Customer,
    }
}

/// Both routers wired to one shared in-memory backend.
pub struct TestContext {
    pub backend: Arc<MemoryBackend>,
    storefront: Router,
    admin: Router,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build the routers with an empty backend.
    #[must_use]
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());

        let storefront_config = clementine_storefront::config::StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            backend: clementine_storefront::config::BackendConfig {
                base_url: "http://backend.invalid".to_string(),
                api_key: SecretString::from("unused".to_string()),
                timeout: Duration::from_secs(1),
            },
            order_submit: clementine_storefront::config::OrderSubmitConfig {
                attempts: 3,
                backoff: Duration::ZERO,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let storefront_state = clementine_storefront::state::AppState::with_providers(
            storefront_config,
            backend.clone(),
            backend.clone(),
            backend.clone(),
        );

        let storefront = Router::new()
            .merge(clementine_storefront::routes::routes())
            .layer(clementine_storefront::middleware::create_session_layer())
            .with_state(storefront_state);

        let admin_config = clementine_admin::config::AdminConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            admin_token: SecretString::from(ADMIN_TOKEN.to_string()),
            backend_base_url: "http://backend.invalid".to_string(),
            backend_api_key: SecretString::from("unused".to_string()),
            backend_timeout: Duration::from_secs(1),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let admin_state = clementine_admin::state::AppState::with_providers(
            admin_config,
            backend.clone(),
            backend.clone(),
        );

        let admin = Router::new()
            .merge(clementine_admin::routes::routes())
            .with_state(admin_state);

        Self {
            backend,
            storefront,
            admin,
        }
    }

    /// A cookie-carrying client for the storefront router.
    #[must_use]
    pub fn storefront_client(&self) -> SessionClient {
        SessionClient {
            app: self.storefront.clone(),
            cookie: None,
        }
    }

    /// One admin request with the given bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or executed.
    pub async fn admin_request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request built");

        let response = self
            .admin
            .clone()
            .oneshot(request)
            .await
            .expect("router responded");

        read_response(response).await
    }
}

/// Drives one router while carrying the session cookie between requests.
pub struct SessionClient {
    app: Router,
    cookie: Option<String>,
}

impl SessionClient {
    /// Send a request, remembering any session cookie the router sets.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or executed.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.clone());
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request built");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router responded");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE)
            && let Ok(value) = set_cookie.to_str()
            && let Some(pair) = value.split(';').next()
        {
            self.cookie = Some(pair.to_owned());
        }

        read_response(response).await
    }

    /// GET a path.
    pub async fn get(&mut self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    /// POST a JSON body.
    pub async fn post(&mut self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PATCH a JSON body.
    pub async fn patch(&mut self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE a path.
    pub async fn delete(&mut self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None).await
    }
}

/// Collect a response into (status, JSON body); non-JSON bodies become
/// `Value::Null`.
async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collected")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
