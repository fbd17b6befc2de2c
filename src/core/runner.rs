//! # Run a single delivery.
//!
//! Invokes one subscriber with one event, containing every way the call can go wrong.
//!
//! - **Catch panics** with `catch_unwind`
//! - **Apply timeout** if configured (wraps execution in `tokio::time::timeout`)
//! - **Report failures** on the [`ReportBus`] and in the log
//!
//! ## Outcome flow
//!
//! ```text
//! Success:
//!   sub.on_event() → Ok(())  → nothing reported
//!
//! Failure:
//!   sub.on_event() → Err(e)  → warn!  + ReportKind::Failed
//!
//! Panic:
//!   sub.on_event() → panic   → error! + ReportKind::Panicked
//!
//! Timeout:
//!   timeout exceeded         → warn!  + ReportKind::TimedOut (future dropped)
//! ```
//!
//! ## Rules
//! - Reports **at most one** failure per delivery.
//! - Never propagates anything to the caller beyond the classification.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::events::{DeliveryReport, Event, ReportBus, ReportKind};
use crate::subscribers::Subscribe;

/// Delivers `event` to `sub` once, reporting any contained failure to `reports`.
///
/// ### Timeout behavior
/// If `timeout` is `Some(dur)` and `dur > 0` the invocation is dropped once `dur` elapses.
pub(crate) async fn deliver_once(
    sub: &dyn Subscribe,
    event: &Event,
    timeout: Option<Duration>,
    reports: &ReportBus,
) -> Result<(), ReportKind> {
    let call = AssertUnwindSafe(sub.on_event(event)).catch_unwind();

    let res = if let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) {
        match time::timeout(dur, call).await {
            Ok(r) => r,
            Err(_elapsed) => {
                tracing::warn!(
                    subscriber = sub.name(),
                    seq = event.seq,
                    timeout = ?dur,
                    "delivery timed out"
                );
                reports.publish(DeliveryReport::timed_out(sub.name(), event.seq, dur));
                return Err(ReportKind::TimedOut);
            }
        }
    } else {
        call.await
    };

    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::warn!(
                subscriber = sub.name(),
                seq = event.seq,
                order = %event.order_id,
                error = %e,
                label = e.as_label(),
                "delivery failed"
            );
            reports.publish(DeliveryReport::failed(sub.name(), event.seq, e.to_string()));
            Err(ReportKind::Failed)
        }
        Err(panic_err) => {
            let info = panic_message(&*panic_err);
            tracing::error!(
                subscriber = sub.name(),
                seq = event.seq,
                order = %event.order_id,
                panic = %info,
                "subscriber panicked"
            );
            reports.publish(DeliveryReport::panicked(sub.name(), event.seq, info));
            Err(ReportKind::Panicked)
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
