//! # LogisticsReactor: creates a waybill once an order is shipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::{Event, OrderStatus};
use crate::subscribers::Subscribe;

/// Shipping manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waybill {
    /// Waybill number: `YD<unix millis>-<n>`.
    pub number: String,
    /// Order being shipped.
    pub order_id: Arc<str>,
}

/// Creates waybills for orders moving from `PendingDelivery` to `Delivered`.
#[derive(Default)]
pub struct LogisticsReactor {
    issued: AtomicU64,
    manifest: Mutex<Vec<Waybill>>,
}

impl LogisticsReactor {
    /// Construct a new [`LogisticsReactor`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waybills created so far.
    pub fn manifest(&self) -> Vec<Waybill> {
        self.manifest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Subscribe for LogisticsReactor {
    async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
        if !ev.is_transition(OrderStatus::PendingDelivery, OrderStatus::Delivered) {
            return Ok(());
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SubscriberError::Fail {
                reason: format!("clock before unix epoch: {e}"),
            })?
            .as_millis();
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        let number = format!("YD{millis}-{n}");
        tracing::info!(
            order = %ev.order_id,
            waybill = %number,
            "logistics: order shipped, waybill created"
        );

        self.manifest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Waybill {
                number,
                order_id: Arc::clone(&ev.order_id),
            });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "logistics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_waybill_created_on_delivery() {
        let logistics = LogisticsReactor::new();
        let ev = Event::new("o-5", OrderStatus::PendingDelivery, OrderStatus::Delivered);
        logistics.on_event(&ev).await.unwrap();
        logistics.on_event(&ev).await.unwrap();

        let manifest = logistics.manifest();
        assert_eq!(manifest.len(), 2);
        assert!(manifest[0].number.starts_with("YD"));
        assert!(manifest[0].number.ends_with("-1"));
        assert_ne!(manifest[0].number, manifest[1].number);
        assert_eq!(&*manifest[1].order_id, "o-5");
    }

    #[tokio::test]
    async fn test_ignores_payment() {
        let logistics = LogisticsReactor::new();
        let ev = Event::new("o-5", OrderStatus::PendingPayment, OrderStatus::Paid);
        logistics.on_event(&ev).await.unwrap();
        assert!(logistics.manifest().is_empty());
    }
}
