//! # LogWriter: structured event logger
//!
//! A minimal subscriber that logs every incoming [`Event`] through `tracing`.
//! Cancellations are logged at `warn`, everything else at `info`.
//!
//! ## Example output
//! ```text
//! INFO orderbus: order status changed seq=0 order=A-1 from=pending payment to=paid user=Some("u-1")
//! WARN orderbus: order cancelled seq=3 order=A-2 from=paid user=None
//! ```

use async_trait::async_trait;

use crate::error::SubscriberError;
use crate::events::{Event, OrderStatus};
use crate::subscribers::Subscribe;

/// Event logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) -> Result<(), SubscriberError> {
        match e.to {
            OrderStatus::Cancelled => {
                tracing::warn!(
                    seq = e.seq,
                    order = %e.order_id,
                    from = %e.from,
                    user = ?e.user_id.as_deref(),
                    "order cancelled"
                );
            }
            _ => {
                tracing::info!(
                    seq = e.seq,
                    order = %e.order_id,
                    from = %e.from,
                    to = %e.to,
                    user = ?e.user_id.as_deref(),
                    "order status changed"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
