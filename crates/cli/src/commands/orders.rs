//! Order management commands.

use tracing::info;

use clementine_core::provider::OrderAdmin;
use clementine_core::{OrderId, OrderStatus};

use super::{CliError, backend_client};

/// List every order.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list() -> Result<(), CliError> {
    let client = backend_client()?;
    let orders = client.list_orders().await?;

    info!("{} orders", orders.len());
    for order in &orders {
        info!(
            "{}  {}  {}  {}  {}",
            order.id,
            order.order.created_at.format("%Y-%m-%d %H:%M"),
            order.status(),
            order.order.customer,
            order.order.total_amount,
        );
    }

    Ok(())
}

/// Set an order's status.
///
/// The transition is checked client-side against the order's current
/// status for early feedback; the admin surface validates it again.
///
/// # Errors
///
/// Returns an error for an unknown status, an illegal transition, or a
/// failed backend call.
pub async fn set_status(id: &str, status: &str) -> Result<(), CliError> {
    let status: OrderStatus = status
        .parse()
        .map_err(|_| CliError::InvalidStatus(status.to_owned()))?;

    let client = backend_client()?;
    let id = OrderId::new(id);

    let order = client.get_order(&id).await?;
    let next = order
        .status()
        .transition_to(status)
        .map_err(clementine_core::provider::StoreError::from)?;

    let updated = client.update_status(&id, next).await?;
    info!("Order {} is now {}", updated.id, updated.status());

    Ok(())
}
