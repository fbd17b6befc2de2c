//! # Report bus for broadcasting delivery failures.
//!
//! [`ReportBus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets
//! every worker publish [`DeliveryReport`]s without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Receivers (any number):
//!   worker 1 ──┐
//!   worker 2 ──┼──────► ReportBus ───────► Dispatcher::reports()
//!   worker N ──┤     (broadcast chan)
//!   publish  ──┘     (overflow only)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent reports for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: reports are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::report::DeliveryReport;

/// Broadcast channel for delivery reports.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct ReportBus {
    tx: broadcast::Sender<DeliveryReport>,
}

impl ReportBus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<DeliveryReport>(capacity);
        Self { tx }
    }

    /// Publishes a report to all active receivers.
    ///
    /// If there are no receivers, the report is dropped.
    pub fn publish(&self, report: DeliveryReport) {
        let _ = self.tx.send(report);
    }

    /// Creates a new receiver that will observe subsequent reports.
    ///
    /// A receiver only gets reports **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.tx.subscribe()
    }
}
