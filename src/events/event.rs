//! # Order status change events.
//!
//! The [`OrderStatus`] enum names every state an order can be in, and
//! [`Event`] records one confirmed transition between two of them.
//!
//! ## Immutability
//! An [`Event`] is built once by the state owner and then only read. The
//! dispatcher wraps it in an `Arc` and hands the same allocation to every
//! subscriber, so all fields are plain values or `Arc<str>`.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Delivery reports carry the `seq` of the event they refer to.
//!
//! ## Example
//! ```rust
//! use orderbus::{Event, OrderStatus};
//!
//! let ev = Event::new("A-1001", OrderStatus::PendingPayment, OrderStatus::Paid)
//!     .with_user("u-42");
//!
//! assert!(ev.is_transition(OrderStatus::PendingPayment, OrderStatus::Paid));
//! assert_eq!(ev.user_id.as_deref(), Some("u-42"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle states of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Created, waiting for the customer to pay.
    PendingPayment,
    /// Payment received.
    Paid,
    /// Paid and waiting to be shipped.
    PendingDelivery,
    /// Handed over to the carrier.
    Delivered,
    /// Received by the customer.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// Returns a human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending payment",
            OrderStatus::Paid => "paid",
            OrderStatus::PendingDelivery => "pending delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One confirmed order status transition.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp captured at construction
/// - `user_id`: the acting or owning user, when known
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Order the transition belongs to.
    pub order_id: Arc<str>,
    /// Status before the transition.
    pub from: OrderStatus,
    /// Status after the transition.
    pub to: OrderStatus,
    /// User associated with the order, if any.
    pub user_id: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(order_id: impl Into<Arc<str>>, from: OrderStatus, to: OrderStatus) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            order_id: order_id.into(),
            from,
            to,
            user_id: None,
        }
    }

    /// Attaches a user id.
    #[inline]
    pub fn with_user(mut self, user_id: impl Into<Arc<str>>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns true if this event is exactly the `from → to` transition.
    #[inline]
    pub fn is_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.from == from && self.to == to
    }

    /// Milliseconds since the unix epoch at which the event was captured.
    pub fn at_millis(&self) -> u128 {
        self.at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order[{}] {} -> {} (user={}, at={}ms)",
            self.order_id,
            self.from,
            self.to,
            self.user_id.as_deref().unwrap_or("-"),
            self.at_millis(),
        )
    }
}
