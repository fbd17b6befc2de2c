//! Order events and delivery reports.
//!
//! This module groups the event **data model** published by the order
//! service and the **report bus** used to surface contained subscriber
//! failures.
//!
//! ## Contents
//! - [`OrderStatus`], [`Event`] order states and the immutable transition record
//! - [`ReportKind`], [`DeliveryReport`] failure classification and payload
//! - [`ReportBus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Event publishers**: `OrderService::change_status`, or any caller of `Dispatcher::publish`.
//! - **Report publishers**: dispatcher workers (failed/panicked/timed out) and
//!   `Dispatcher::try_publish` (overflow).
//! - **Report consumers**: anything holding `Dispatcher::reports()`.

mod bus;
mod event;
mod report;

pub use bus::ReportBus;
pub use event::{Event, OrderStatus};
pub use report::{DeliveryReport, ReportKind};
