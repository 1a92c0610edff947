//! Integration tests for the checkout wizard and order placement.

use axum::http::StatusCode;
use serde_json::{Value, json};

use clementine_core::catalog::Category;
use clementine_integration_tests::{SessionClient, TestContext, sample_product, sample_user};

fn seeded_context() -> TestContext {
    let ctx = TestContext::new();
    ctx.backend
        .add_product(sample_product("p1", Category::Men, "10", 2));
    ctx.backend
        .add_product(sample_product("p2", Category::Accessories, "5", 1));
    ctx
}

async fn fill_cart(client: &mut SessionClient) {
    let (status, _) = client
        .post("/cart/items", json!({"product_id": "p1", "quantity": 2}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client
        .post("/cart/items", json!({"product_id": "p2", "quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

fn personal() -> Value {
    json!({"name": "Jane Doe", "email": "jane@example.com", "phone": "03001234567"})
}

fn shipping() -> Value {
    json!({
        "address": "12 High Street",
        "city": "Lahore",
        "state": "Punjab",
        "postal_code": "54000",
        "country": "Pakistan"
    })
}

async fn complete_first_two_steps(client: &mut SessionClient) {
    let (status, _) = client.post("/checkout/personal", personal()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.post("/checkout/shipping", shipping()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_entry_requires_items() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, body) = client.get("/checkout").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["redirect"], "/products");
}

#[tokio::test]
async fn test_step_gating_and_field_errors() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;

    let (_, body) = client.get("/checkout").await;
    assert_eq!(body["step"], "personal");

    // Invalid email: step unchanged, error keyed by field.
    let (status, body) = client
        .post(
            "/checkout/personal",
            json!({"name": "Jane Doe", "email": "not-an-email", "phone": "03001234567"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .any(|f| f["field"] == "email")
    );

    let (_, body) = client.get("/checkout").await;
    assert_eq!(body["step"], "personal");

    // Valid data advances.
    let (status, body) = client.post("/checkout/personal", personal()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "shipping");

    // Shipping cannot be skipped ahead of time was already enforced; now
    // a bad postal code keeps us on shipping.
    let (status, body) = client
        .post(
            "/checkout/shipping",
            json!({
                "address": "12 High Street",
                "city": "Lahore",
                "state": "Punjab",
                "postal_code": "123",
                "country": "Pakistan"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .any(|f| f["field"] == "postal_code")
    );
}

#[tokio::test]
async fn test_skipping_steps_is_rejected() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;

    let (status, _) = client.post("/checkout/shipping", shipping()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = client
        .post("/checkout/payment", json!({"method": "cash-on-delivery"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_back_never_loses_data() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;
    complete_first_two_steps(&mut client).await;

    let (_, body) = client.post("/checkout/back", json!({})).await;
    assert_eq!(body["step"], "shipping");
    let (_, body) = client.post("/checkout/back", json!({})).await;
    assert_eq!(body["step"], "personal");

    let (_, body) = client.get("/checkout").await;
    assert_eq!(body["personal"]["name"], "Jane Doe");
    assert_eq!(body["shipping"]["city"], "Lahore");
}

#[tokio::test]
async fn test_card_validation_and_masking() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;
    complete_first_two_steps(&mut client).await;

    // Too-short card number fails with field errors.
    let (status, body) = client
        .post(
            "/checkout/payment",
            json!({
                "method": "card",
                "card": {"number": "4242", "expiry": "04/27", "cvv": "123", "holder_name": "Jane Doe"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .any(|f| f["field"] == "card_number")
    );

    // An unformatted 16-digit number is normalized by the input mask and
    // accepted; the stored order carries only the masked form.
    let (status, body) = client
        .post(
            "/checkout/payment",
            json!({
                "method": "card",
                "card": {
                    "number": "4242424242424242",
                    "expiry": "0427",
                    "cvv": "123",
                    "holder_name": "Jane Doe"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payment"]["method"], "card");
    assert_eq!(body["payment"]["status"], "paid");
    assert_eq!(body["payment"]["card_number"], "**** **** **** 4242");
    assert_eq!(body["payment"]["card_cvv"], "***");
}

#[tokio::test]
async fn test_order_snapshot_and_cart_clearing() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;
    complete_first_two_steps(&mut client).await;

    let (status, order) = client
        .post(
            "/checkout/payment",
            json!({"method": "cash-on-delivery", "notes": "Leave at the door"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Snapshot fidelity: 2 x 10 + 1 x 5.
    assert_eq!(order["total_amount"], "25");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment"]["status"], "pending");
    assert_eq!(order["customer"], "guest");
    assert_eq!(order["notes"], "Leave at the door");

    // The cart is cleared by the successful submission.
    let (_, cart) = client.get("/cart").await;
    assert_eq!(cart["total_quantity"], 0);

    // The placing session can read the order back; a fresh session cannot.
    let order_id = order["id"].as_str().expect("order id");
    let (status, fetched) = client.get(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_amount"], "25");

    let mut stranger = ctx.storefront_client();
    let (status, _) = stranger.get(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submission_retries_transient_failures() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;
    complete_first_two_steps(&mut client).await;

    // Two transient failures, then success - within the 3 allowed attempts.
    ctx.backend.fail_next_order_creates(2);

    let (status, _) = client
        .post("/checkout/payment", json!({"method": "cash-on-delivery"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.backend.order_create_calls(), 3);
    assert_eq!(ctx.backend.order_count(), 1);
}

#[tokio::test]
async fn test_failed_submission_preserves_draft_for_retry() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();
    fill_cart(&mut client).await;
    complete_first_two_steps(&mut client).await;

    // More failures than allowed attempts: the submission fails.
    ctx.backend.fail_next_order_creates(10);

    let (status, body) = client
        .post("/checkout/payment", json!({"method": "cash-on-delivery"}))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], true);
    assert_eq!(ctx.backend.order_count(), 0);

    // Cart and draft survived; plain retry succeeds without re-entry.
    ctx.backend.fail_next_order_creates(0);
    let (_, cart) = client.get("/cart").await;
    assert_eq!(cart["total_quantity"], 3);

    let (status, order) = client
        .post("/checkout/payment", json!({"method": "cash-on-delivery"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_amount"], "25");
    assert_eq!(ctx.backend.order_count(), 1);
}

#[tokio::test]
async fn test_signed_in_checkout_tags_and_lists_orders() {
    let ctx = seeded_context();
    ctx.backend
        .add_user("token-jane", sample_user("u-1", "jane@example.com"));

    let mut client = ctx.storefront_client();

    // Guests get a 401 on order history.
    let (status, _) = client.get("/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, user) = client
        .post("/auth/session", json!({"id_token": "token-jane"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], "u-1");

    fill_cart(&mut client).await;

    // The signed-in user's details are offered as prefill.
    let (_, view) = client.get("/checkout").await;
    assert_eq!(view["prefill"]["email"], "jane@example.com");

    complete_first_two_steps(&mut client).await;
    let (status, order) = client
        .post("/checkout/payment", json!({"method": "cash-on-delivery"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["customer"], "u-1");

    let (status, orders) = client.get("/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(1));

    // Sign out; the history is gone but the placed order stays readable
    // through the placing session.
    let (status, _) = client.delete("/auth/session").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.get("/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, _) = client
        .post("/auth/session", json!({"id_token": "forged"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
