//! In-session shopping cart with derived totals.
//!
//! The cart holds at most one line per product; adding an existing product
//! increases its quantity. `total_quantity` and `total_amount` are derived
//! values: they are recomputed from the lines by a full scan after every
//! mutation and are never set directly. A full scan is O(n) per mutation,
//! which is fine for carts of tens of items and avoids the drift bugs an
//! incremental accumulator invites.
//!
//! Quantities are `u32`, so negative quantities are unrepresentable.
//! `set_quantity(_, 0)` removes the line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductId;

/// One line of a cart: a product snapshot plus a quantity.
///
/// Name, price, and image are copied from the catalog when the line is
/// created, so later catalog edits do not change what the customer sees in
/// their cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to. Unique within a cart.
    pub product_id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price at the time it was added.
    pub price: Decimal,
    /// Number of units. Always at least 1 while the line exists.
    pub quantity: u32,
    /// Product image at the time it was added.
    pub image_url: String,
}

impl CartItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The in-session cart: lines in insertion order plus derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    total_quantity: u32,
    total_amount: Decimal,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of the quantities of all lines.
    #[must_use]
    pub const fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product, if present.
    #[must_use]
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Whether the cart has a line for the given product.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.item(product_id).is_some()
    }

    /// Add `quantity` units of a product.
    ///
    /// If a line for the product already exists its quantity increases;
    /// otherwise a new line is appended with a snapshot of the product's
    /// name, price, and image. Adding zero units is a no-op.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            existing.quantity += quantity;
        } else {
            self.items.push(CartItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity,
                image_url: product.image_url.clone(),
            });
        }

        self.recompute_totals();
    }

    /// Remove the line for a product. A no-op when the product is absent.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product_id != product_id);
        self.recompute_totals();
    }

    /// Set a line's quantity directly (not additive).
    ///
    /// A quantity of zero removes the line. A no-op when the product is
    /// absent.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
        {
            item.quantity = quantity;
        }

        self.recompute_totals();
    }

    /// Empty the cart. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }

    /// Recompute both totals from the lines.
    ///
    /// Called strictly after every mutation, before any reader can observe
    /// the new state.
    fn recompute_totals(&mut self) {
        self.total_quantity = self.items.iter().map(|i| i.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::{Category, Product};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            category: Category::Men,
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            created_at: Utc::now(),
        }
    }

    /// Totals must equal the sums over the lines after every mutation.
    fn assert_totals_consistent(cart: &Cart) {
        let quantity: u32 = cart.items().iter().map(|i| i.quantity).sum();
        let amount: Decimal = cart.items().iter().map(CartItem::line_total).sum();
        assert_eq!(cart.total_quantity(), quantity);
        assert_eq!(cart.total_amount(), amount);
    }

    #[test]
    fn test_add_new_items() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", dec("10")), 2);
        cart.add_item(&product("p2", dec("5")), 1);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total_amount(), dec("25"));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_add_existing_id_merges() {
        let mut cart = Cart::new();
        let p1 = product("p1", dec("10"));
        cart.add_item(&p1, 2);
        cart.add_item(&p1, 3);

        // One line per product id; quantities are additive across adds.
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item(&p1.id).unwrap().quantity, 5);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", dec("10")), 0);
        assert!(cart.is_empty());
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        let p1 = product("p1", dec("10"));
        cart.add_item(&p1, 2);
        cart.remove_item(&p1.id);

        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), Decimal::ZERO);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", dec("10")), 1);
        cart.remove_item(&ProductId::new("missing"));

        assert_eq!(cart.items().len(), 1);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_set_quantity_not_additive() {
        let mut cart = Cart::new();
        let p1 = product("p1", dec("10"));
        cart.add_item(&p1, 2);
        cart.set_quantity(&p1.id, 7);

        assert_eq!(cart.item(&p1.id).unwrap().quantity, 7);
        assert_eq!(cart.total_amount(), dec("70"));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        let p1 = product("p1", dec("10"));
        cart.add_item(&p1, 2);
        cart.set_quantity(&p1.id, 0);

        assert!(!cart.contains(&p1.id));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", dec("10")), 2);

        cart.clear();
        let once = cart.clone();
        cart.clear();

        assert_eq!(cart, once);
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_hold_across_mutation_sequences() {
        let p1 = product("p1", dec("19.99"));
        let p2 = product("p2", dec("4.50"));
        let p3 = product("p3", dec("120"));

        let mut cart = Cart::new();
        cart.add_item(&p1, 1);
        assert_totals_consistent(&cart);
        cart.add_item(&p2, 4);
        assert_totals_consistent(&cart);
        cart.add_item(&p1, 2);
        assert_totals_consistent(&cart);
        cart.set_quantity(&p2.id, 1);
        assert_totals_consistent(&cart);
        cart.add_item(&p3, 1);
        assert_totals_consistent(&cart);
        cart.remove_item(&p1.id);
        assert_totals_consistent(&cart);
        cart.set_quantity(&p3.id, 0);
        assert_totals_consistent(&cart);

        assert_eq!(cart.total_amount(), dec("4.50"));
        assert_eq!(cart.total_quantity(), 1);
    }
}
