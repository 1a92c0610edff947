//! Order submission with bounded retry.
//!
//! Order creation is the one backend call whose failure is expensive for
//! the user - a whole checkout form to redo - so it gets a retry policy:
//! a handful of attempts with exponential backoff and jitter, retrying
//! only errors classified as transient. Everything else in the storefront
//! keeps the plain single-attempt behavior.

use std::time::Duration;

use rand::Rng;
use tracing::{instrument, warn};

use clementine_core::order::{NewOrder, Order};
use clementine_core::provider::{OrderStore, StoreError};

use crate::config::OrderSubmitConfig;

/// Submit an order, retrying transient failures.
///
/// Attempts are bounded by `policy.attempts`. Between attempts the delay
/// doubles from `policy.backoff`, with up to 50% added jitter; a rate
/// limit's `Retry-After` wins when it is longer.
///
/// # Errors
///
/// Returns the last [`StoreError`] once attempts are exhausted, or
/// immediately for non-retryable errors.
#[instrument(skip_all, fields(attempts = policy.attempts))]
pub async fn submit_with_retry(
    store: &dyn OrderStore,
    order: &NewOrder,
    policy: &OrderSubmitConfig,
) -> Result<Order, StoreError> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match store.create_order(order).await {
            Ok(order) => return Ok(order),
            Err(err) if err.is_retryable() && attempt < policy.attempts => {
                let delay = next_delay(policy, attempt, &err);
                warn!(
                    attempt,
                    error = %err,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Order submission failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Delay before the next attempt: exponential backoff with jitter, or the
/// backend's own `Retry-After` when that is longer.
fn next_delay(policy: &OrderSubmitConfig, attempt: u32, err: &StoreError) -> Duration {
    let backoff = policy.backoff * 2u32.saturating_pow(attempt - 1);
    let jitter = backoff.mul_f64(rand::rng().random_range(0.0..0.5));
    let delay = backoff + jitter;

    match err {
        StoreError::RateLimited { retry_after_secs } => {
            delay.max(Duration::from_secs(*retry_after_secs))
        }
        _ => delay,
    }
}
