//! Integration tests for the session cart API.

use axum::http::{Method, StatusCode};
use serde_json::json;

use clementine_core::catalog::Category;
use clementine_integration_tests::{TestContext, sample_product};

fn seeded_context() -> TestContext {
    let ctx = TestContext::new();
    ctx.backend
        .add_product(sample_product("p1", Category::Men, "10", 3));
    ctx.backend
        .add_product(sample_product("p2", Category::Women, "5.50", 1));
    ctx
}

#[tokio::test]
async fn test_cart_starts_empty() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, body) = client.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["total_quantity"], 0);

    let (status, body) = client.get("/cart/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_add_snapshots_product_and_merges_duplicates() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, body) = client
        .post("/cart/items", json!({"product_id": "p1", "quantity": 2}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["name"], "Product p1");
    assert_eq!(body["items"][0]["price"], "10");
    assert_eq!(body["total_quantity"], 2);

    // Adding the same product again merges into one line.
    let (status, body) = client
        .post("/cart/items", json!({"product_id": "p1", "quantity": 3}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["quantity"], 5);
    assert_eq!(body["total_amount"], "50");
}

#[tokio::test]
async fn test_totals_follow_mutations() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    client
        .post("/cart/items", json!({"product_id": "p1", "quantity": 2}))
        .await;
    let (_, body) = client
        .post("/cart/items", json!({"product_id": "p2"}))
        .await;
    assert_eq!(body["total_quantity"], 3);
    assert_eq!(body["total_amount"], "25.50");

    let (status, body) = client
        .patch("/cart/items/p1", json!({"quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_amount"], "15.50");

    let (status, body) = client.delete("/cart/items/p2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_quantity"], 1);
    assert_eq!(body["total_amount"], "10");
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    client
        .post("/cart/items", json!({"product_id": "p1", "quantity": 2}))
        .await;
    let (status, body) = client
        .patch("/cart/items/p1", json!({"quantity": 0}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["total_amount"], "0");
}

#[tokio::test]
async fn test_adding_unknown_product_is_404() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, _) = client
        .post("/cart/items", json!({"product_id": "nope"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The cart is untouched.
    let (_, body) = client.get("/cart").await;
    assert_eq!(body["total_quantity"], 0);
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let ctx = seeded_context();
    let mut first = ctx.storefront_client();
    let mut second = ctx.storefront_client();

    first
        .post("/cart/items", json!({"product_id": "p1"}))
        .await;

    let (_, body) = second.get("/cart").await;
    assert_eq!(body["total_quantity"], 0);

    let (_, body) = first.get("/cart").await;
    assert_eq!(body["total_quantity"], 1);
}

#[tokio::test]
async fn test_catalog_filtering_via_query() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, body) = client
        .get("/products?category=men&min_price=0&max_price=100")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], "p1");

    let (_, body) = client.get("/products?category=men&max_price=4").await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (_, body) = client.get("/products?sort=price-low").await;
    assert_eq!(body[0]["id"], "p2");

    let (status, _) = client.get("/products?category=toys").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    let (status, body) = client.get("/products/p2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Product p2");
    assert_eq!(body["category"], "women");

    let (status, _) = client.get("/products/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_request_method_shapes() {
    let ctx = seeded_context();
    let mut client = ctx.storefront_client();

    // PATCH needs a JSON body.
    let (status, _) = client
        .request(Method::PATCH, "/cart/items/p1", None)
        .await;
    assert_ne!(status, StatusCode::OK);
}
