//! The three-step checkout wizard.
//!
//! Steps run strictly in order - Personal, Shipping, Payment - with no
//! skipping. A step's data is only committed once its validation passes;
//! an invalid submission leaves the flow exactly where it was, with the
//! failures keyed by field. Going back is always allowed and never
//! discards anything already entered.
//!
//! The wizard itself never touches the network. [`CheckoutFlow::finalize`]
//! produces the immutable [`NewOrder`] snapshot; persisting it (and
//! clearing the cart afterwards) is the caller's job, which is what keeps
//! the draft intact when the backend call fails.

mod validate;

pub mod format;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::order::NewOrder;
use crate::types::{PaymentMethod, UserId};

pub use validate::{FieldError, ValidationErrors};

/// Which form the customer is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Personal,
    Shipping,
    Payment,
}

/// Contact details collected in step 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl PersonalInfo {
    /// Validate name, email, and phone.
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate::require(&mut errors, "name", &self.name, "Name is required");
        validate::require_email(&mut errors, "email", &self.email);
        validate::require_phone(&mut errors, "phone", &self.phone);
        errors
    }
}

/// Delivery address collected in step 2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Validate the address fields.
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate::require(&mut errors, "address", &self.address, "Address is required");
        validate::require(&mut errors, "city", &self.city, "City is required");
        validate::require(&mut errors, "state", &self.state, "State is required");
        validate::require_postal_code(&mut errors, "postal_code", &self.postal_code);
        validate::require(&mut errors, "country", &self.country, "Country is required");
        errors
    }
}

/// Card fields collected in step 3 when paying by card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    /// 16 digits in 4 groups, as produced by [`format::format_card_number`].
    pub number: String,
    /// `MM/YY`.
    pub expiry: String,
    /// 3-4 digits.
    pub cvv: String,
    /// Name on the card.
    pub holder_name: String,
}

/// Payment selection collected in step 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Present when `method` is [`PaymentMethod::Card`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardDetails>,
}

impl PaymentDetails {
    /// Validate the payment selection.
    ///
    /// Cash on delivery needs nothing further; card payment requires all
    /// four card fields to pass.
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.method == PaymentMethod::Card {
            if let Some(card) = &self.card {
                validate::require_card_number(&mut errors, "card_number", &card.number);
                validate::require_card_expiry(&mut errors, "card_expiry", &card.expiry);
                validate::require_card_cvv(&mut errors, "card_cvv", &card.cvv);
                validate::require(
                    &mut errors,
                    "card_name",
                    &card.holder_name,
                    "Cardholder name is required",
                );
            } else {
                errors.push("card_number", "Card details are required");
            }
        }
        errors
    }
}

/// Everything entered so far, committed step by step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub personal: Option<PersonalInfo>,
    pub shipping: Option<ShippingInfo>,
    pub payment: Option<PaymentDetails>,
    pub notes: Option<String>,
}

/// Errors the wizard can produce.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Step input failed validation; the flow did not advance.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A step was submitted before the ones ahead of it.
    #[error("complete the previous checkout steps first")]
    OutOfOrder,

    /// Submission was attempted with an empty cart.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// Submission was attempted before every step was committed.
    #[error("checkout is incomplete")]
    Incomplete,
}

/// The wizard: current step plus the committed draft.
///
/// Serializable so it can live in the session between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    draft: CheckoutDraft,
}

impl CheckoutFlow {
    /// Start a fresh checkout at the personal-info step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The step the customer is currently on.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Everything committed so far.
    #[must_use]
    pub const fn draft(&self) -> &CheckoutDraft {
        &self.draft
    }

    /// Submit step 1. On success the flow advances to shipping.
    ///
    /// Resubmitting after going back overwrites the stored data and
    /// advances again.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Validation`] with the failing fields; the step does
    /// not change and previously committed data is untouched.
    pub fn submit_personal(&mut self, info: PersonalInfo) -> Result<(), CheckoutError> {
        info.validate()
            .into_result()
            .map_err(CheckoutError::Validation)?;

        self.draft.personal = Some(info);
        if self.step == CheckoutStep::Personal {
            self.step = CheckoutStep::Shipping;
        }
        Ok(())
    }

    /// Submit step 2. On success the flow advances to payment.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::OutOfOrder`] when personal info was never
    /// committed, or [`CheckoutError::Validation`] with the failing fields.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), CheckoutError> {
        if self.draft.personal.is_none() {
            return Err(CheckoutError::OutOfOrder);
        }

        info.validate()
            .into_result()
            .map_err(CheckoutError::Validation)?;

        self.draft.shipping = Some(info);
        if self.step == CheckoutStep::Shipping {
            self.step = CheckoutStep::Payment;
        }
        Ok(())
    }

    /// Submit step 3, committing the payment selection and optional order
    /// notes. The flow is then ready to [`finalize`](Self::finalize).
    ///
    /// # Errors
    ///
    /// [`CheckoutError::OutOfOrder`] when the earlier steps were never
    /// committed, or [`CheckoutError::Validation`] with the failing fields.
    pub fn submit_payment(
        &mut self,
        details: PaymentDetails,
        notes: Option<String>,
    ) -> Result<(), CheckoutError> {
        if self.draft.personal.is_none() || self.draft.shipping.is_none() {
            return Err(CheckoutError::OutOfOrder);
        }

        details
            .validate()
            .into_result()
            .map_err(CheckoutError::Validation)?;

        self.draft.payment = Some(details);
        self.draft.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(())
    }

    /// Go back one step. Never fails, never discards entered data; at the
    /// first step this is a no-op.
    pub fn back(&mut self) {
        self.step = match self.step {
            CheckoutStep::Personal | CheckoutStep::Shipping => CheckoutStep::Personal,
            CheckoutStep::Payment => CheckoutStep::Shipping,
        };
    }

    /// Assemble the order snapshot from the committed draft and the cart.
    ///
    /// The flow itself is left untouched, so a failed persistence attempt
    /// can be retried without re-entering anything.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when the cart has no lines, or
    /// [`CheckoutError::Incomplete`] when any step is missing.
    pub fn finalize(
        &self,
        cart: &Cart,
        customer: UserId,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<NewOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (Some(personal), Some(shipping), Some(payment)) = (
            &self.draft.personal,
            &self.draft.shipping,
            &self.draft.payment,
        ) else {
            return Err(CheckoutError::Incomplete);
        };

        Ok(NewOrder::assemble(
            cart,
            customer,
            personal.clone(),
            shipping.clone(),
            payment,
            self.draft.notes.clone(),
            now,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::{Category, Product};
    use crate::types::{OrderStatus, PaymentStatus, ProductId};

    fn valid_personal() -> PersonalInfo {
        PersonalInfo {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "03001234567".into(),
        }
    }

    fn valid_shipping() -> ShippingInfo {
        ShippingInfo {
            address: "12 High Street".into(),
            city: "Lahore".into(),
            state: "Punjab".into(),
            postal_code: "54000".into(),
            country: "Pakistan".into(),
        }
    }

    fn valid_card() -> PaymentDetails {
        PaymentDetails {
            method: PaymentMethod::Card,
            card: Some(CardDetails {
                number: "4242 4242 4242 4242".into(),
                expiry: "04/27".into(),
                cvv: "123".into(),
                holder_name: "Jane Doe".into(),
            }),
        }
    }

    fn cod() -> PaymentDetails {
        PaymentDetails {
            method: PaymentMethod::CashOnDelivery,
            card: None,
        }
    }

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            category: Category::Men,
            image_url: String::new(),
            created_at: Utc::now(),
        }
    }

    fn filled_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 10), 2);
        cart.add_item(&product("p2", 5), 1);
        cart
    }

    #[test]
    fn test_invalid_personal_keeps_step_and_reports_fields() {
        let mut flow = CheckoutFlow::new();
        let err = flow
            .submit_personal(PersonalInfo {
                name: "Jane Doe".into(),
                email: "not-an-email".into(),
                phone: "03001234567".into(),
            })
            .unwrap_err();

        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("email").is_some());
        assert_eq!(flow.step(), CheckoutStep::Personal);
        assert!(flow.draft().personal.is_none());
    }

    #[test]
    fn test_valid_personal_advances() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();

        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert!(flow.draft().personal.is_some());
    }

    #[test]
    fn test_no_skipping_ahead() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(
            flow.submit_shipping(valid_shipping()).unwrap_err(),
            CheckoutError::OutOfOrder
        );
        assert_eq!(
            flow.submit_payment(cod(), None).unwrap_err(),
            CheckoutError::OutOfOrder
        );
    }

    #[test]
    fn test_invalid_postal_code_blocks_shipping() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();

        let err = flow
            .submit_shipping(ShippingInfo {
                postal_code: "123".into(),
                ..valid_shipping()
            })
            .unwrap_err();

        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("postal_code").is_some());
        assert_eq!(flow.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_back_preserves_data() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        assert_eq!(flow.step(), CheckoutStep::Payment);

        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Shipping);
        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Personal);
        flow.back();
        assert_eq!(flow.step(), CheckoutStep::Personal);

        // Nothing entered was lost.
        assert_eq!(flow.draft().personal, Some(valid_personal()));
        assert_eq!(flow.draft().shipping, Some(valid_shipping()));
    }

    #[test]
    fn test_resubmitting_after_back_overwrites_and_advances() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        flow.back();
        flow.back();

        let updated = PersonalInfo {
            name: "Janet Doe".into(),
            ..valid_personal()
        };
        flow.submit_personal(updated.clone()).unwrap();

        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert_eq!(flow.draft().personal, Some(updated));
        // Shipping data from before the back-track is still there.
        assert_eq!(flow.draft().shipping, Some(valid_shipping()));
    }

    #[test]
    fn test_card_payment_requires_card_fields() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();

        let err = flow
            .submit_payment(
                PaymentDetails {
                    method: PaymentMethod::Card,
                    card: None,
                },
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));

        let err = flow
            .submit_payment(
                PaymentDetails {
                    method: PaymentMethod::Card,
                    card: Some(CardDetails {
                        number: "4242".into(),
                        expiry: "0427".into(),
                        cvv: "1".into(),
                        holder_name: String::new(),
                    }),
                },
                None,
            )
            .unwrap_err();
        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_cash_on_delivery_needs_no_card() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        flow.submit_payment(cod(), Some("Leave at the door".into()))
            .unwrap();

        assert_eq!(flow.draft().notes.as_deref(), Some("Leave at the door"));
    }

    #[test]
    fn test_finalize_rejects_empty_cart() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        flow.submit_payment(cod(), None).unwrap();

        let err = flow
            .finalize(&Cart::new(), UserId::guest(), Utc::now())
            .unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn test_finalize_rejects_incomplete_draft() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();

        let err = flow
            .finalize(&filled_cart(), UserId::guest(), Utc::now())
            .unwrap_err();
        assert_eq!(err, CheckoutError::Incomplete);
    }

    #[test]
    fn test_finalize_snapshots_cart() {
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        flow.submit_payment(valid_card(), None).unwrap();

        let mut cart = filled_cart();
        let now = Utc::now();
        let order = flow
            .finalize(&cart, UserId::new("u-1"), now)
            .unwrap();

        assert_eq!(order.total_amount, Decimal::from(25));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, now);
        assert_eq!(order.payment.status, PaymentStatus::Paid);

        // Mutating or clearing the cart afterwards cannot touch the order.
        cart.clear();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, Decimal::from(25));
    }

    #[test]
    fn test_failed_submission_leaves_flow_retryable() {
        // A backend failure happens after finalize; the flow must still be
        // able to produce the same order again.
        let mut flow = CheckoutFlow::new();
        flow.submit_personal(valid_personal()).unwrap();
        flow.submit_shipping(valid_shipping()).unwrap();
        flow.submit_payment(cod(), None).unwrap();

        let cart = filled_cart();
        let now = Utc::now();
        let first = flow.finalize(&cart, UserId::guest(), now).unwrap();
        let second = flow.finalize(&cart, UserId::guest(), now).unwrap();
        assert_eq!(first, second);
    }
}
