//! # InventoryReactor: deducts stock once an order is paid.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::{Event, OrderStatus};
use crate::subscribers::Subscribe;

/// Deducts stock for orders moving from `PendingPayment` to `Paid`.
///
/// Keeps the ids of the orders it deducted stock for.
#[derive(Default)]
pub struct InventoryReactor {
    deducted: Mutex<Vec<Arc<str>>>,
}

impl InventoryReactor {
    /// Construct a new [`InventoryReactor`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders whose stock has been deducted, in handling order.
    pub fn deductions(&self) -> Vec<Arc<str>> {
        self.deducted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Subscribe for InventoryReactor {
    async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
        if !ev.is_transition(OrderStatus::PendingPayment, OrderStatus::Paid) {
            return Ok(());
        }
        tracing::info!(
            order = %ev.order_id,
            seq = ev.seq,
            "inventory: order paid, deducting stock"
        );
        self.deducted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&ev.order_id));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "inventory"
    }
}
