//! Live input masks for the payment form.
//!
//! Applied on every keystroke, not just at validation time: the UI feeds
//! the raw field value through these and writes the result back. They are
//! conveniences, not correctness checks - validation happens separately.

/// Group card number digits into blocks of 4 separated by spaces.
///
/// Non-digits are dropped, then the result is truncated to 19 characters
/// (16 digits + 3 spaces).
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let mut out = String::with_capacity(19);
    for (i, c) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(16)
        .enumerate()
    {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Insert a `/` after the second expiry digit and truncate to 5 characters.
#[must_use]
pub fn format_card_expiry(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    match digits.split_at_checked(2) {
        Some((month, rest)) if !rest.is_empty() => format!("{month}/{rest}"),
        _ => digits,
    }
}

/// Keep only digits and truncate to 4 characters.
#[must_use]
pub fn format_card_cvv(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(4).collect()
}
