//! # Order event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberRegistry`]
//! the dispatcher fans out over, and built-in reactions.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   OrderService ── publish(Event) ──► Dispatcher ──► one delivery per registered subscriber
//!                                                        │
//!                                                        ├──► Subscribe::on_event(&Event)
//!                                                        │         │
//!                                                        │    ┌────┴──────┬──────────┬────────────┐
//!                                                        │    ▼           ▼          ▼            ▼
//!                                                        │  Inventory  Billing  Logistics  Notification
//!                                                        │
//!                                                        └──► failures ──► ReportBus
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use orderbus::{Event, OrderStatus, Subscribe, SubscriberError};
//! use async_trait::async_trait;
//!
//! struct RefundSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for RefundSubscriber {
//!     async fn on_event(&self, event: &Event) -> Result<(), SubscriberError> {
//!         if event.is_transition(OrderStatus::Paid, OrderStatus::Cancelled) {
//!             // start a refund
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod embedded;
mod registry;
mod subscriber;

pub use embedded::{
    Bill, BillingReactor, InventoryReactor, LogWriter, LogisticsReactor, Notice,
    NotificationReactor, Waybill,
};
pub use registry::SubscriberRegistry;
pub use subscriber::Subscribe;
