//! Immutable order records.
//!
//! An order is created exactly once, at checkout submission, from a
//! snapshot of the cart plus the committed checkout draft. After that only
//! its status ever changes (through the admin path, validated against the
//! transition graph in [`OrderStatus`]). Card numbers are masked before
//! they reach a payload; the full number is never part of an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::checkout::{PaymentDetails, PersonalInfo, ShippingInfo};
use crate::types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

/// One ordered line: the cart line as it stood at submission time.
///
/// The price is captured at order time, not re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image_url: String,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            image_url: item.image_url.clone(),
        }
    }
}

/// Payment record stored on an order.
///
/// Card payments keep only the masked number and a masked CVV; cash on
/// delivery keeps nothing but the method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_cvv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<String>,
}

impl From<&PaymentDetails> for PaymentInfo {
    fn from(details: &PaymentDetails) -> Self {
        let card = details
            .card
            .as_ref()
            .filter(|_| details.method == PaymentMethod::Card);

        Self {
            method: details.method,
            status: PaymentStatus::for_method(details.method),
            card_number: card.map(|c| mask_card_number(&c.number)),
            card_cvv: card.map(|_| MASKED_CVV.to_owned()),
            card_holder: card.map(|c| c.holder_name.clone()),
        }
    }
}

/// What a masked CVV is stored as.
const MASKED_CVV: &str = "***";

/// Replace all but the last four digits of a card number.
///
/// ```
/// use clementine_core::order::mask_card_number;
///
/// assert_eq!(mask_card_number("4242 4242 4242 4242"), "**** **** **** 4242");
/// ```
#[must_use]
pub fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let last4: String = digits
        .iter()
        .skip(digits.len().saturating_sub(4))
        .collect();
    format!("**** **** **** {last4}")
}

/// An order as submitted to the backend, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// The authenticated user's id, or the guest marker.
    pub customer: UserId,
    /// Snapshot of the cart lines at submission time.
    pub items: Vec<OrderItem>,
    pub personal: PersonalInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Cart total at submission time.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Snapshot a cart and the committed checkout data into an order
    /// payload. Status starts at [`OrderStatus::Pending`].
    #[must_use]
    pub fn assemble(
        cart: &Cart,
        customer: UserId,
        personal: PersonalInfo,
        shipping: ShippingInfo,
        payment: &PaymentDetails,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            customer,
            items: cart.items().iter().map(OrderItem::from).collect(),
            personal,
            shipping,
            payment: PaymentInfo::from(payment),
            notes,
            total_amount: cart.total_amount(),
            status: OrderStatus::Pending,
            created_at: now,
        }
    }
}

/// A persisted order: the payload plus the backend-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub order: NewOrder,
}

impl Order {
    /// The order's lifecycle status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.order.status
    }

    /// Whether the given user may read this order.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        !self.order.customer.is_guest() && &self.order.customer == user
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::{Category, Product};
    use crate::checkout::CardDetails;

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            category: Category::Women,
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            created_at: Utc::now(),
        }
    }

    fn personal() -> PersonalInfo {
        PersonalInfo {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "03001234567".into(),
        }
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            address: "12 High Street".into(),
            city: "Lahore".into(),
            state: "Punjab".into(),
            postal_code: "54000".into(),
            country: "Pakistan".into(),
        }
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(
            mask_card_number("4242 4242 4242 4242"),
            "**** **** **** 4242"
        );
        assert_eq!(
            mask_card_number("1111222233334444"),
            "**** **** **** 4444"
        );
    }

    #[test]
    fn test_card_payment_is_masked_and_paid() {
        let details = PaymentDetails {
            method: PaymentMethod::Card,
            card: Some(CardDetails {
                number: "4242 4242 4242 4242".into(),
                expiry: "04/27".into(),
                cvv: "123".into(),
                holder_name: "Jane Doe".into(),
            }),
        };

        let info = PaymentInfo::from(&details);
        assert_eq!(info.status, PaymentStatus::Paid);
        assert_eq!(info.card_number.as_deref(), Some("**** **** **** 4242"));
        assert_eq!(info.card_cvv.as_deref(), Some("***"));
        assert_eq!(info.card_holder.as_deref(), Some("Jane Doe"));

        // The full number must not survive anywhere in the payload.
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("4242 4242 4242 4242"));
    }

    #[test]
    fn test_cod_payment_is_pending_without_card_fields() {
        let info = PaymentInfo::from(&PaymentDetails {
            method: PaymentMethod::CashOnDelivery,
            card: None,
        });

        assert_eq!(info.status, PaymentStatus::Pending);
        assert!(info.card_number.is_none());
        assert!(info.card_cvv.is_none());
    }

    #[test]
    fn test_assemble_snapshots_totals_and_items() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 10), 2);
        cart.add_item(&product("p2", 5), 1);

        let now = Utc::now();
        let order = NewOrder::assemble(
            &cart,
            UserId::new("u-1"),
            personal(),
            shipping(),
            &PaymentDetails::default(),
            None,
            now,
        );

        assert_eq!(order.total_amount, Decimal::from(25));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, now);

        let first = order.items.first().unwrap();
        assert_eq!(first.product_id.as_str(), "p1");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.price, Decimal::from(10));
    }

    #[test]
    fn test_ownership() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 10), 1);

        let make = |customer: UserId| Order {
            id: OrderId::new("ord-1"),
            order: NewOrder::assemble(
                &cart,
                customer,
                personal(),
                shipping(),
                &PaymentDetails::default(),
                None,
                Utc::now(),
            ),
        };

        let owned = make(UserId::new("u-1"));
        assert!(owned.is_owned_by(&UserId::new("u-1")));
        assert!(!owned.is_owned_by(&UserId::new("u-2")));

        // Guest orders are owned by nobody, not even another guest session.
        let guest = make(UserId::guest());
        assert!(!guest.is_owned_by(&UserId::guest()));
    }

    #[test]
    fn test_order_serde_flattens_payload() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 10), 1);

        let order = Order {
            id: OrderId::new("ord-1"),
            order: NewOrder::assemble(
                &cart,
                UserId::guest(),
                personal(),
                shipping(),
                &PaymentDetails::default(),
                None,
                Utc::now(),
            ),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["id"], "ord-1");
        assert_eq!(value["customer"], "guest");
        assert_eq!(value["status"], "pending");

        let parsed: Order = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, order);
    }
}
