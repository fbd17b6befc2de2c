//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for a [`Dispatcher`](crate::Dispatcher).
//!
//! ## Sentinel values
//! - `delivery_timeout = 0s` → no per-delivery timeout
//! - `workers`, `queue_capacity`, `report_capacity` → clamped to a minimum of 1

use std::time::Duration;

/// Configuration for a dispatcher.
///
/// ## Field semantics
/// - `workers`: fixed worker pool size; bounds concurrent subscriber invocations
/// - `queue_capacity`: bounded delivery queue shared by all workers (backpressure point)
/// - `grace`: maximum wait for queued and in-flight deliveries during shutdown
/// - `delivery_timeout`: per-delivery timeout (`0s` = none)
/// - `report_capacity`: delivery report ring buffer size
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of worker tasks in the pool.
    ///
    /// Fixed at construction; the pool never grows.
    pub workers: usize,

    /// Capacity of the delivery queue.
    ///
    /// `Dispatcher::publish` waits for space when the queue is full;
    /// `Dispatcher::try_publish` drops and reports instead.
    pub queue_capacity: usize,

    /// Maximum time to wait for the pool to drain on shutdown.
    ///
    /// If exceeded, shutdown returns `DispatchError::GraceExceeded`.
    pub grace: Duration,

    /// Per-delivery timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = deliveries running longer are abandoned and reported as `TimedOut`
    pub delivery_timeout: Duration,

    /// Capacity of the delivery report broadcast channel.
    pub report_capacity: usize,
}

impl Config {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the per-delivery timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per delivery
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.delivery_timeout == Duration::ZERO {
            None
        } else {
            Some(self.delivery_timeout)
        }
    }

    /// Returns the report bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn report_capacity_clamped(&self) -> usize {
        self.report_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `workers = 5`
    /// - `queue_capacity = 1024`
    /// - `grace = 30s`
    /// - `delivery_timeout = 0s` (no timeout)
    /// - `report_capacity = 256`
    fn default() -> Self {
        Self {
            workers: 5,
            queue_capacity: 1024,
            grace: Duration::from_secs(30),
            delivery_timeout: Duration::ZERO,
            report_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = Config {
            workers: 0,
            queue_capacity: 0,
            report_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.report_capacity_clamped(), 1);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let mut cfg = Config::default();
        assert_eq!(cfg.timeout(), None);
        cfg.delivery_timeout = Duration::from_millis(250);
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(250)));
    }
}
