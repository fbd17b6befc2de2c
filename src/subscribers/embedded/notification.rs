//! # NotificationReactor: tells the user their order has shipped.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::{Event, OrderStatus};
use crate::subscribers::Subscribe;

/// Message sent to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Recipient.
    pub user_id: Arc<str>,
    /// Order the notice is about.
    pub order_id: Arc<str>,
    /// Message body.
    pub text: String,
}

/// Notifies users of orders moving from `PendingDelivery` to `Delivered`.
///
/// Fails with [`SubscriberError::Fail`] when the event has no user to notify.
#[derive(Default)]
pub struct NotificationReactor {
    outbox: Mutex<Vec<Notice>>,
}

impl NotificationReactor {
    /// Construct a new [`NotificationReactor`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices sent so far.
    pub fn outbox(&self) -> Vec<Notice> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Subscribe for NotificationReactor {
    async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
        if !ev.is_transition(OrderStatus::PendingDelivery, OrderStatus::Delivered) {
            return Ok(());
        }
        let Some(user_id) = ev.user_id.clone() else {
            return Err(SubscriberError::Fail {
                reason: format!("order {} has no user to notify", ev.order_id),
            });
        };
        let text = format!("Your order {} has been shipped.", ev.order_id);
        tracing::info!(user = %user_id, order = %ev.order_id, "notify: shipment message sent");

        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice {
                user_id,
                order_id: Arc::clone(&ev.order_id),
                text,
            });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "notification"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notice_sent_to_user() {
        let notify = NotificationReactor::new();
        let ev = Event::new("o-8", OrderStatus::PendingDelivery, OrderStatus::Delivered)
            .with_user("u-3");
        notify.on_event(&ev).await.unwrap();

        let outbox = notify.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(&*outbox[0].user_id, "u-3");
        assert_eq!(outbox[0].text, "Your order o-8 has been shipped.");
    }

    #[tokio::test]
    async fn test_missing_user_is_an_error() {
        let notify = NotificationReactor::new();
        let ev = Event::new("o-9", OrderStatus::PendingDelivery, OrderStatus::Delivered);
        let err = notify.on_event(&ev).await.unwrap_err();
        assert_eq!(err.as_label(), "subscriber_failed");
        assert!(notify.outbox().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_ignored_for_other_transitions() {
        let notify = NotificationReactor::new();
        let ev = Event::new("o-9", OrderStatus::PendingPayment, OrderStatus::Paid);
        assert!(notify.on_event(&ev).await.is_ok());
    }
}
