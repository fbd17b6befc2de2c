//! # Delivery reports.
//!
//! A [`DeliveryReport`] is the only place a contained subscriber failure
//! becomes visible outside the worker that caught it. Reports are broadcast
//! on the [`ReportBus`](super::ReportBus); nobody is required to listen.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Classification of contained delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Subscriber returned an error.
    ///
    /// Sets:
    /// - `reason`: error message
    Failed,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: panic info/message
    Panicked,

    /// Subscriber exceeded the configured delivery timeout.
    ///
    /// Sets:
    /// - `reason`: configured timeout
    TimedOut,

    /// Delivery was dropped because the queue was full.
    ///
    /// Sets:
    /// - `reason`: "queue full"
    Overflow,
}

impl ReportKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            ReportKind::Failed => "delivery_failed",
            ReportKind::Panicked => "delivery_panicked",
            ReportKind::TimedOut => "delivery_timed_out",
            ReportKind::Overflow => "delivery_overflow",
        }
    }
}

/// Record of one contained delivery failure.
#[derive(Clone, Debug)]
pub struct DeliveryReport {
    /// Wall-clock timestamp of the report.
    pub at: SystemTime,
    /// Failure classification.
    pub kind: ReportKind,
    /// Name of the subscriber the delivery was for.
    pub subscriber: &'static str,
    /// Sequence number of the event being delivered.
    pub event_seq: u64,
    /// Human-readable reason.
    pub reason: Arc<str>,
}

impl DeliveryReport {
    fn new(
        kind: ReportKind,
        subscriber: &'static str,
        event_seq: u64,
        reason: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            at: SystemTime::now(),
            kind,
            subscriber,
            event_seq,
            reason: reason.into(),
        }
    }

    /// Creates a report for a subscriber that returned an error.
    #[inline]
    pub fn failed(subscriber: &'static str, event_seq: u64, reason: impl Into<Arc<str>>) -> Self {
        Self::new(ReportKind::Failed, subscriber, event_seq, reason)
    }

    /// Creates a subscriber panic report.
    #[inline]
    pub fn panicked(subscriber: &'static str, event_seq: u64, info: String) -> Self {
        Self::new(ReportKind::Panicked, subscriber, event_seq, info)
    }

    /// Creates a report for a delivery that ran past `timeout`.
    #[inline]
    pub fn timed_out(subscriber: &'static str, event_seq: u64, timeout: Duration) -> Self {
        Self::new(
            ReportKind::TimedOut,
            subscriber,
            event_seq,
            format!("timed out after {timeout:?}"),
        )
    }

    /// Creates a report for a delivery dropped at submission.
    #[inline]
    pub fn overflow(subscriber: &'static str, event_seq: u64, reason: &'static str) -> Self {
        Self::new(ReportKind::Overflow, subscriber, event_seq, reason)
    }
}
