//! # orderbus
//!
//! **orderbus** delivers order status changes to independent reaction
//! handlers on a fixed-size async worker pool.
//!
//! The order service owns the authoritative state. Every confirmed
//! transition becomes an immutable [`Event`] that the [`Dispatcher`] fans
//! out to each registered [`Subscribe`] implementation without making the
//! service wait for any of them.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌────────────────────────────────────────────┐
//!     │ OrderService::change_status(id, from, to)  │
//!     │   1. commit new status                     │
//!     │   2. Event::new(id, from, to)              │
//!     └──────────────────────┬─────────────────────┘
//!                            ▼ publish(Event)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - SubscriberRegistry (insertion order, identity dedup)           │
//! │  - WorkerPool (N workers, one bounded queue)                      │
//! │  - ReportBus (broadcast of contained failures)                    │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!   Delivery(sub 1)    Delivery(sub 2)    Delivery(sub K)      │
//!        └──────────────────┼──────────────────┘               │
//!                           ▼                                  │
//!               [bounded delivery queue]                       │
//!                 ┌─────────┼─────────┐                        │
//!                 ▼         ▼         ▼                        │
//!              worker1   worker2   workerN                     │
//!                 ▼         ▼         ▼                        ▼
//!            sub.on_event(&Event)  ── Err / panic / timeout ──► ReportBus
//! ```
//!
//! ### Lifecycle
//! ```text
//! Dispatcher::builder(cfg).with_subscribers(..).build()   (spawns N workers)
//!   │
//!   ├─► register / unregister            (any time, brief registry lock)
//!   ├─► publish(Event)                   (one delivery per subscriber, returns once enqueued)
//!   │
//!   └─► shutdown()
//!         ├─ close queue                 → publish() = Err(DispatchError::Closed)
//!         ├─ drain queued + in-flight    (bounded by Config::grace)
//!         └─ Ok(()) or Err(DispatchError::GraceExceeded)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Events**        | Immutable order status transitions.                           | [`Event`], [`OrderStatus`]                 |
//! | **Subscriber API**| Reactions to status changes, with built-in examples.          | [`Subscribe`], [`InventoryReactor`], ...   |
//! | **Dispatch**      | Async fan-out over a fixed worker pool, graceful shutdown.    | [`Dispatcher`], [`Config`]                 |
//! | **Observability** | Contained failures as reports and `tracing` logs.             | [`DeliveryReport`], [`ReportKind`]         |
//! | **Errors**        | Typed errors for dispatch, subscribers and the order service. | [`DispatchError`], [`SubscriberError`]     |
//! | **State owner**   | Order status store that publishes every transition.           | [`OrderService`]                           |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use orderbus::{
//!     BillingReactor, Config, Dispatcher, InventoryReactor, OrderService, OrderStatus, Subscribe,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inventory = Arc::new(InventoryReactor::new());
//!     let billing = Arc::new(BillingReactor::new());
//!
//!     let dispatcher = Dispatcher::builder(Config::default())
//!         .with_subscribers(vec![
//!             inventory.clone() as Arc<dyn Subscribe>,
//!             billing.clone() as Arc<dyn Subscribe>,
//!         ])
//!         .build();
//!
//!     let orders = OrderService::new(Arc::clone(&dispatcher));
//!     orders.place("A-1001");
//!     orders
//!         .change_status("A-1001", OrderStatus::PendingPayment, OrderStatus::Paid, Some("u-42"))
//!         .await?;
//!
//!     dispatcher.shutdown().await?;
//!     assert_eq!(inventory.deductions().len(), 1);
//!     assert_eq!(billing.bills().len(), 1);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod service;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Dispatcher, DispatcherBuilder, ShutdownSignal, wait_for_signal};
pub use error::{DispatchError, ServiceError, SubscriberError};
pub use events::{DeliveryReport, Event, OrderStatus, ReportBus, ReportKind};
pub use service::OrderService;
pub use subscribers::{
    Bill, BillingReactor, InventoryReactor, LogWriter, LogisticsReactor, Notice,
    NotificationReactor, Subscribe, SubscriberRegistry, Waybill,
};
