//! # BillingReactor: issues a receipt bill once an order is paid.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::{Event, OrderStatus};
use crate::subscribers::Subscribe;

/// A bill issued for a paid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    /// Bill number, starting from 1 per reactor.
    pub number: u64,
    /// Order the bill was issued for.
    pub order_id: Arc<str>,
    /// User billed, if the event carried one.
    pub user_id: Option<Arc<str>>,
}

/// Issues bills for orders moving from `PendingPayment` to `Paid`.
#[derive(Default)]
pub struct BillingReactor {
    next_number: AtomicU64,
    bills: Mutex<Vec<Bill>>,
}

impl BillingReactor {
    /// Construct a new [`BillingReactor`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bills issued so far.
    pub fn bills(&self) -> Vec<Bill> {
        self.bills
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Subscribe for BillingReactor {
    async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
        if !ev.is_transition(OrderStatus::PendingPayment, OrderStatus::Paid) {
            return Ok(());
        }
        let number = self.next_number.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            order = %ev.order_id,
            bill = number,
            "billing: order paid, receipt bill issued"
        );

        self.bills
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Bill {
                number,
                order_id: Arc::clone(&ev.order_id),
                user_id: ev.user_id.clone(),
            });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "billing"
    }
}
