//! Error types used by the dispatcher, subscribers and the order service.
//!
//! This module defines three error enums:
//!
//! - [`DispatchError`] errors raised by the dispatcher itself (call-time misuse, shutdown).
//! - [`SubscriberError`] errors returned by individual subscriber invocations.
//! - [`ServiceError`] errors raised by the order service when changing state.
//!
//! All of them provide `as_label` / `as_message` helpers for logging/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::events::OrderStatus;

/// # Errors produced by the dispatcher.
///
/// Subscriber failures never show up here: they are contained by the worker
/// pool and surfaced as [`DeliveryReport`](crate::DeliveryReport)s instead.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher has been shut down and no longer accepts events.
    #[error("dispatcher is shut down")]
    Closed,

    /// Shutdown drain did not finish within its bound; remaining work was abandoned.
    #[error("shutdown timeout {grace:?} exceeded; {pending} deliveries abandoned")]
    GraceExceeded {
        /// The drain bound that was exceeded.
        grace: Duration,
        /// Deliveries still queued or in flight when the bound ran out.
        pending: usize,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use orderbus::DispatchError;
    /// use std::time::Duration;
    ///
    /// let err = DispatchError::GraceExceeded { grace: Duration::from_secs(5), pending: 3 };
    /// assert_eq!(err.as_label(), "dispatch_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
            DispatchError::GraceExceeded { .. } => "dispatch_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Closed => "dispatcher closed".to_string(),
            DispatchError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending deliveries={pending}")
            }
        }
    }
}

/// # Errors produced by a subscriber while handling an event.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// The reaction could not be carried out for this event.
    #[error("reaction failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// A downstream service the subscriber depends on is unavailable.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        /// Name of the downstream service.
        service: &'static str,
        /// The underlying error message.
        reason: String,
    },
}

impl SubscriberError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscriberError::Fail { .. } => "subscriber_failed",
            SubscriberError::Unavailable { .. } => "subscriber_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscriberError::Fail { reason } => format!("error: {reason}"),
            SubscriberError::Unavailable { service, reason } => {
                format!("unavailable: {service}: {reason}")
            }
        }
    }
}

/// # Errors produced by the order service.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No order with this id has been placed.
    #[error("unknown order {order_id}")]
    UnknownOrder {
        /// The order id that was looked up.
        order_id: String,
    },

    /// The caller's view of the current status is out of date; nothing was changed.
    #[error("order {order_id} is {actual}, not {expected}")]
    StatusConflict {
        /// The order id.
        order_id: String,
        /// Status the caller expected the order to be in.
        expected: OrderStatus,
        /// Status the order is actually in.
        actual: OrderStatus,
    },

    /// The status change was committed but its event could not be published.
    #[error("status committed but not published: {0}")]
    Publish(#[from] DispatchError),
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use orderbus::{DispatchError, ServiceError};
    ///
    /// let err = ServiceError::from(DispatchError::Closed);
    /// assert_eq!(err.as_label(), "service_publish");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::UnknownOrder { .. } => "service_unknown_order",
            ServiceError::StatusConflict { .. } => "service_status_conflict",
            ServiceError::Publish(_) => "service_publish",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::UnknownOrder { order_id } => format!("unknown order: {order_id}"),
            ServiceError::StatusConflict {
                order_id,
                expected,
                actual,
            } => format!("conflict: order={order_id} expected={expected} actual={actual}"),
            ServiceError::Publish(e) => format!("publish: {}", e.as_message()),
        }
    }
}
