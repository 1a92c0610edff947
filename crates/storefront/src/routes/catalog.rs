//! Catalog route handlers.
//!
//! The catalog is fetched wholesale from the backend (cached client-side)
//! and filtered/sorted here per request. Read failures surface as
//! page-level errors; there is no automatic retry on the read path.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use clementine_core::ProductId;
use clementine_core::catalog::{CategoryFilter, Product, ProductFilter, SortKey};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Catalog listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Category name, or `all` (the default).
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// `latest`, `price-low`, or `price-high`.
    pub sort: Option<String>,
}

impl CatalogQuery {
    /// Turn the raw query into a validated [`ProductFilter`].
    fn into_filter(self) -> Result<ProductFilter> {
        let category = match self.category.as_deref() {
            None | Some("all") => CategoryFilter::All,
            Some(name) => CategoryFilter::Only(name.parse().map_err(AppError::BadRequest)?),
        };

        let sort = match self.sort.as_deref() {
            None => SortKey::Latest,
            Some(key) => key.parse().map_err(AppError::BadRequest)?,
        };

        let defaults = ProductFilter::default();
        let min_price = self.min_price.unwrap_or(defaults.min_price);
        let max_price = self.max_price.unwrap_or(defaults.max_price);

        if min_price > max_price {
            return Err(AppError::BadRequest(
                "min_price cannot exceed max_price".to_string(),
            ));
        }

        Ok(ProductFilter {
            category,
            min_price,
            max_price,
            sort,
        })
    }
}

/// List products matching the requested filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = query.into_filter()?;
    let products = state.catalog().list_products().await?;

    Ok(Json(filter.apply(&products)))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state.catalog().get_product(&ProductId::new(id)).await?;
    Ok(Json(product))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::catalog::Category;

    use super::*;

    #[test]
    fn test_default_query_is_permissive() {
        let filter = CatalogQuery::default().into_filter().unwrap();
        assert_eq!(filter.category, CategoryFilter::All);
        assert_eq!(filter.sort, SortKey::Latest);
        assert_eq!(filter.min_price, Decimal::ZERO);
    }

    #[test]
    fn test_category_parsing() {
        let query = CatalogQuery {
            category: Some("women".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(
            query.into_filter().unwrap().category,
            CategoryFilter::Only(Category::Women)
        );

        let query = CatalogQuery {
            category: Some("all".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.into_filter().unwrap().category, CategoryFilter::All);

        let query = CatalogQuery {
            category: Some("toys".to_string()),
            ..CatalogQuery::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_inverted_price_range_is_rejected() {
        let query = CatalogQuery {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(10)),
            ..CatalogQuery::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_bad_sort_key_is_rejected() {
        let query = CatalogQuery {
            sort: Some("oldest".to_string()),
            ..CatalogQuery::default()
        };
        assert!(query.into_filter().is_err());
    }
}
