//! # Order service: the state owner that publishes status changes.
//!
//! [`OrderService`] keeps the authoritative status of each order and turns
//! every confirmed transition into an [`Event`] on its [`Dispatcher`].
//!
//! ## Flow
//! ```text
//! change_status(order, from, to, user)
//!   ├─► unknown order        → ServiceError::UnknownOrder     (nothing changed)
//!   ├─► status != from       → ServiceError::StatusConflict   (nothing changed)
//!   └─► commit `to`
//!         └─► Dispatcher::publish(Event)
//!               ├─ Ok  → Arc<Event>
//!               └─ Err → ServiceError::Publish (status stays committed)
//! ```
//!
//! Publication is fire-and-forget relative to the state change: a publish
//! failure is reported to the caller but never rolls the status back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::Dispatcher;
use crate::error::ServiceError;
use crate::events::{Event, OrderStatus};

/// Authoritative order state wired to a dispatcher.
pub struct OrderService {
    orders: Mutex<HashMap<String, OrderStatus>>,
    dispatcher: Arc<Dispatcher>,
}

impl OrderService {
    /// Creates an empty service publishing through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Records a new order in [`OrderStatus::PendingPayment`].
    ///
    /// Returns `false` if the order id is already known; its status is left untouched.
    pub fn place(&self, order_id: impl Into<String>) -> bool {
        let mut orders = self.orders.lock().unwrap_or_else(PoisonError::into_inner);
        let order_id = order_id.into();
        if orders.contains_key(&order_id) {
            return false;
        }
        tracing::debug!(order = %order_id, "order placed");
        orders.insert(order_id, OrderStatus::PendingPayment);
        true
    }

    /// Current status of an order.
    pub fn status(&self, order_id: &str) -> Option<OrderStatus> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(order_id)
            .copied()
    }

    /// Moves `order_id` from `from` to `to` and publishes the transition.
    ///
    /// ### Errors
    /// - [`ServiceError::UnknownOrder`] / [`ServiceError::StatusConflict`]: nothing changed, nothing published.
    /// - [`ServiceError::Publish`]: the status **was** changed, the event was not published.
    pub async fn change_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
        user_id: Option<&str>,
    ) -> Result<Arc<Event>, ServiceError> {
        {
            let mut orders = self.orders.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(current) = orders.get_mut(order_id) else {
                return Err(ServiceError::UnknownOrder {
                    order_id: order_id.to_string(),
                });
            };
            if *current != from {
                return Err(ServiceError::StatusConflict {
                    order_id: order_id.to_string(),
                    expected: from,
                    actual: *current,
                });
            }
            *current = to;
        }
        tracing::info!(order = order_id, from = %from, to = %to, "order status updated");

        let mut event = Event::new(order_id, from, to);
        if let Some(user) = user_id {
            event = event.with_user(user);
        }
        let event = Arc::new(event);

        if let Err(e) = self.dispatcher.publish_arc(Arc::clone(&event)).await {
            tracing::warn!(
                order = order_id,
                seq = event.seq,
                error = %e,
                "status change not published"
            );
            return Err(e.into());
        }
        Ok(event)
    }

    /// The dispatcher this service publishes through.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
