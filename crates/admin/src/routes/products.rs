//! Product management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use clementine_core::ProductId;
use clementine_core::catalog::{NewProduct, Product, ProductPatch};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Create a product.
#[instrument(skip(_admin, state, product), fields(name = %product.name))]
pub async fn create(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if product.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if product.price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "Product price cannot be negative".to_string(),
        ));
    }

    let created = state.catalog().create_product(&product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a product.
#[instrument(skip(_admin, state, patch))]
pub async fn update(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("Empty product update".to_string()));
    }
    if patch.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::BadRequest(
            "Product price cannot be negative".to_string(),
        ));
    }

    let updated = state
        .catalog()
        .update_product(&ProductId::new(id), &patch)
        .await?;
    Ok(Json(updated))
}

/// Delete a product.
#[instrument(skip(_admin, state))]
pub async fn delete(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog().delete_product(&ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
