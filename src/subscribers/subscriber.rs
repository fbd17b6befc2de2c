//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] the capability every reaction handler implements.
//!
//! Each delivery gets:
//! - **A pool worker** (never the publisher's task)
//! - **Failure isolation** (errors, panics and timeouts are caught and reported)
//!
//! ## Architecture
//! ```text
//! Dispatcher ──► [delivery queue] ──► worker k ──► subscriber.on_event()
//!                                              ├─► Err   → ReportKind::Failed
//!                                              ├─► panic → ReportKind::Panicked
//!                                              └─► slow  → ReportKind::TimedOut
//! ```
//!
//! ## Rules
//! - Subscribers must not share mutable state with each other; the same
//!   event may be handled by several subscribers at once, in any order.
//! - Filter on the transition you care about and return `Ok(())` for the rest.
//! - A failing subscriber affects only its own delivery.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use orderbus::{Event, OrderStatus, Subscribe, SubscriberError};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
//!         if ev.to == OrderStatus::Cancelled {
//!             // write an audit record, etc.
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::Event;

/// Reaction handler for order status events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Report failures through the returned `Result`; do not panic.
/// - Keep state private to the subscriber.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// Called from a pool worker, not in the publisher context.
    /// Returned errors and panics are caught by the dispatcher and reported.
    async fn on_event(&self, event: &Event) -> Result<(), SubscriberError>;

    /// Returns the subscriber name used in logs and delivery reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
