//! Product model and client-side filtering/sorting.
//!
//! The catalog is fetched wholesale from the backend; filtering and sorting
//! happen here as pure functions of (products, filter). There is no hidden
//! state and no pagination, so the view is safe to recompute on every
//! request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A catalog product as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A product as submitted for creation; the backend assigns id and
/// creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
}

/// A partial product update; only the present fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }
}

/// Fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Men,
    Women,
    Kids,
    Accessories,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Men => write!(f, "men"),
            Self::Women => write!(f, "women"),
            Self::Kids => write!(f, "kids"),
            Self::Accessories => write!(f, "accessories"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            "kids" => Ok(Self::Kids),
            "accessories" => Ok(Self::Accessories),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Category selection for a [`ProductFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Keep every category.
    #[default]
    All,
    /// Keep only one category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether a product in `category` passes this filter.
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == category,
        }
    }
}

/// Sort order for the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Newest first (descending `created_at`). The default.
    #[default]
    #[serde(rename = "latest")]
    Latest,
    /// Cheapest first.
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    /// Most expensive first.
    #[serde(rename = "price-high")]
    PriceHighToLow,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Latest),
            "price-low" => Ok(Self::PriceLowToHigh),
            "price-high" => Ok(Self::PriceHighToLow),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// A value object parametrizing one view over the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: CategoryFilter,
    /// Inclusive price bounds, `min <= max`.
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub sort: SortKey,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            min_price: Decimal::ZERO,
            max_price: Decimal::MAX,
            sort: SortKey::Latest,
        }
    }
}

impl ProductFilter {
    /// Whether a single product passes the category and price predicates.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.matches(product.category)
            && product.price >= self.min_price
            && product.price <= self.max_price
    }

    /// Produce the view for this filter: one filtering pass, then a sort.
    ///
    /// Pure and idempotent; ties under the sort key keep no particular
    /// order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut view: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort {
            SortKey::Latest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::PriceLowToHigh => view.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceHighToLow => view.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        view
    }
}
