//! Field validation for the checkout wizard.
//!
//! Failures are collected per field and keyed by field name so the caller
//! can render them inline. Checks are structural character-level tests in
//! the same spirit as [`Email::parse`](crate::Email::parse); nothing here
//! talks to a payment network.

use serde::{Deserialize, Serialize};

use crate::Email;

/// Field-keyed validation messages, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

/// A single field's validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field the message belongs to.
    pub field: String,
    /// Human-readable message for inline display.
    pub message: String,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Iterate over all recorded messages.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Turn the collected set into a `Result`: `Ok` when nothing failed.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Require a non-empty value (after trimming).
pub fn require(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

/// Require a structurally valid email address.
pub fn require_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if Email::parse(value.trim()).is_err() {
        errors.push(field, "Enter a valid email address");
    }
}

/// Require a phone number with 10-11 digits once formatting is stripped.
pub fn require_phone(errors: &mut ValidationErrors, field: &str, value: &str) {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !(10..=11).contains(&digits) {
        errors.push(field, "Enter a valid phone number (10-11 digits)");
    }
}

/// Require a postal code of exactly 5 digits.
pub fn require_postal_code(errors: &mut ValidationErrors, field: &str, value: &str) {
    let v = value.trim();
    if v.len() != 5 || !v.chars().all(|c| c.is_ascii_digit()) {
        errors.push(field, "Postal code must be exactly 5 digits");
    }
}

/// Require a card number of 16 digits in 4 space-separated groups of 4.
pub fn require_card_number(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !is_grouped_card_number(value.trim()) {
        errors.push(field, "Card number must be 16 digits");
    }
}

/// Require an expiry matching the `MM/YY` shape.
pub fn require_card_expiry(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !is_expiry(value.trim()) {
        errors.push(field, "Expiry must be in MM/YY format");
    }
}

/// Require a CVV of 3-4 digits.
pub fn require_card_cvv(errors: &mut ValidationErrors, field: &str, value: &str) {
    let v = value.trim();
    if !(3..=4).contains(&v.len()) || !v.chars().all(|c| c.is_ascii_digit()) {
        errors.push(field, "CVV must be 3-4 digits");
    }
}

/// `dddd dddd dddd dddd`
fn is_grouped_card_number(value: &str) -> bool {
    let groups: Vec<&str> = value.split(' ').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| g.len() == 4 && g.chars().all(|c| c.is_ascii_digit()))
}

/// `dd/dd`
fn is_expiry(value: &str) -> bool {
    matches!(
        value.as_bytes(),
        [m1, m2, b'/', y1, y2]
            if m1.is_ascii_digit() && m2.is_ascii_digit()
                && y1.is_ascii_digit() && y2.is_ascii_digit()
    )
}
