//! Outbound notifications about orders and stock.
//!
//! Delivery is best effort: callers log a failed notification and carry on,
//! the state change that triggered it is already committed.

use thiserror::Error;

use crate::domain::inventory::LowStockItem;
use crate::domain::order::{Order, OrderStatus};

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The delivery channel refused or dropped the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
    /// The recipient address is missing or unusable.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Receives order and inventory events once they are committed.
pub trait OrderNotifier: Send + Sync {
    fn order_placed(&self, order: &Order) -> Result<(), NotifyError>;
    fn status_changed(&self, order: &Order, from: OrderStatus) -> Result<(), NotifyError>;
    fn low_stock(&self, items: &[LowStockItem]) -> Result<(), NotifyError>;
}

/// Notifier that writes every event to the application log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl OrderNotifier for LogNotifier {
    fn order_placed(&self, order: &Order) -> Result<(), NotifyError> {
        log::info!(
            "order {} placed in store {} for {} {}",
            order.order_number,
            order.store_id,
            order.total_cents,
            order.currency
        );
        Ok(())
    }

    fn status_changed(&self, order: &Order, from: OrderStatus) -> Result<(), NotifyError> {
        log::info!(
            "order {} in store {} moved from {from} to {}",
            order.order_number,
            order.store_id,
            order.status
        );
        Ok(())
    }

    fn low_stock(&self, items: &[LowStockItem]) -> Result<(), NotifyError> {
        for item in items {
            log::warn!(
                "low stock in store {}: product {} ({}) has {} left, threshold {}",
                item.store_id,
                item.product_id,
                item.name,
                item.stock_quantity,
                item.low_stock_threshold
            );
        }
        Ok(())
    }
}

/// Report `result` from a notifier without failing the caller.
pub fn log_failure(event: &str, result: Result<(), NotifyError>) {
    if let Err(err) = result {
        log::error!("Failed to send {event} notification: {err}");
    }
}
