//! # Fixed-size worker pool.
//!
//! [`WorkerPool`] runs deliveries off the publisher's path on a fixed number
//! of tokio tasks that share one bounded queue.
//!
//! ## Architecture
//! ```text
//! Dispatcher::publish
//!     │  (one Delivery per subscriber, registration order)
//!     ▼
//! [bounded mpsc queue] ──► worker 1 ──► deliver_once(sub, event)
//!                      ├─► worker 2 ──► deliver_once(sub, event)
//!                      └─► worker N ──► deliver_once(sub, event)
//! ```
//!
//! ## Rules
//! - **Fixed size**: N workers spawned at start, never more.
//! - **Shared FIFO**: deliveries leave the queue in submission order; completion order is unspecified.
//! - **Graceful drain**: closing the queue lets workers finish everything already queued.
//! - **Hard stop**: after the grace period, idle workers are cancelled and busy ones aborted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::runner::deliver_once;
use crate::error::DispatchError;
use crate::events::{Event, ReportBus};
use crate::subscribers::Subscribe;

/// Decrements the pending counter when a delivery is finished or discarded.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// One subscriber invocation waiting for a worker.
pub(crate) struct Delivery {
    sub: Arc<dyn Subscribe>,
    event: Arc<Event>,
    _pending: PendingGuard,
}

impl Delivery {
    pub(crate) fn subscriber(&self) -> &'static str {
        self.sub.name()
    }
}

type SharedReceiver = Arc<AsyncMutex<mpsc::Receiver<Delivery>>>;

/// Fixed-size pool of delivery workers.
pub(crate) struct WorkerPool {
    tx: RwLock<Option<mpsc::Sender<Delivery>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    pending: Arc<AtomicUsize>,
    stop: CancellationToken,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` workers reading from a queue of `capacity` deliveries.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(
        size: usize,
        capacity: usize,
        timeout: Option<Duration>,
        reports: ReportBus,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Delivery>(capacity.max(1));
        let rx: SharedReceiver = Arc::new(AsyncMutex::new(rx));
        let stop = CancellationToken::new();
        let size = size.max(1);

        let workers = (0..size)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&rx),
                    stop.clone(),
                    timeout,
                    reports.clone(),
                ))
            })
            .collect();

        tracing::debug!(workers = size, queue = capacity.max(1), "worker pool started");
        Self {
            tx: RwLock::new(Some(tx)),
            workers: Mutex::new(workers),
            pending: Arc::new(AtomicUsize::new(0)),
            stop,
            size,
        }
    }

    /// Wraps one subscriber invocation, counting it as pending until it is dropped.
    pub(crate) fn delivery(&self, sub: Arc<dyn Subscribe>, event: Arc<Event>) -> Delivery {
        self.pending.fetch_add(1, Ordering::AcqRel);
        Delivery {
            sub,
            event,
            _pending: PendingGuard(Arc::clone(&self.pending)),
        }
    }

    /// Returns a queue handle, or `None` once the pool is closed.
    pub(crate) fn sender(&self) -> Option<mpsc::Sender<Delivery>> {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stops accepting deliveries. Senders already handed out keep working until dropped.
    pub(crate) fn close(&self) {
        self.tx.write().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub(crate) fn is_closed(&self) -> bool {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Waits up to `grace` for every worker to finish the queue.
    ///
    /// On timeout the workers are cancelled and aborted, and the number of
    /// deliveries that never completed is returned in the error.
    pub(crate) async fn drain(&self, grace: Duration) -> Result<(), DispatchError> {
        let mut handles =
            std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));

        let done = async {
            for h in handles.iter_mut() {
                if let Err(je) = h.await {
                    tracing::error!(error = %je, "delivery worker terminated abnormally");
                }
            }
        };

        let joined = time::timeout(grace, done).await;
        match joined {
            Ok(()) => Ok(()),
            Err(_elapsed) => {
                let pending = self.pending();
                self.stop.cancel();
                for h in &handles {
                    h.abort();
                }
                Err(DispatchError::GraceExceeded { grace, pending })
            }
        }
    }

    /// Deliveries submitted but not yet finished.
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Number of workers.
    pub(crate) fn size(&self) -> usize {
        self.size
    }
}

/// Pulls deliveries until the queue is closed and empty, or `stop` fires.
async fn worker_loop(
    id: usize,
    rx: SharedReceiver,
    stop: CancellationToken,
    timeout: Option<Duration>,
    reports: ReportBus,
) {
    loop {
        let next = tokio::select! {
            _ = stop.cancelled() => break,
            d = async { rx.lock().await.recv().await } => d,
        };
        let Some(delivery) = next else { break };

        let sub = delivery.sub.as_ref();
        let event = delivery.event.as_ref();
        match deliver_once(sub, event, timeout, &reports).await {
            Ok(()) => {
                tracing::trace!(worker = id, subscriber = sub.name(), seq = event.seq, "delivered")
            }
            Err(kind) => tracing::trace!(
                worker = id,
                subscriber = sub.name(),
                seq = event.seq,
                outcome = kind.as_label(),
                "delivery contained"
            ),
        }
    }
    tracing::debug!(worker = id, "delivery worker stopped");
}
