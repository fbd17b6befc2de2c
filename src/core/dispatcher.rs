//! # Dispatcher: subscriber registry, async fan-out, and graceful shutdown.
//!
//! The [`Dispatcher`] owns the [`SubscriberRegistry`], a fixed-size worker
//! pool and the [`ReportBus`]. Publishing an [`Event`] submits one delivery
//! per registered subscriber and returns without waiting for any of them.
//!
//! ## Key responsibilities
//! - keep an insertion-ordered, identity-deduplicated set of subscribers
//! - fan events out to the worker pool off the caller's path
//! - contain subscriber failures (errors, panics, timeouts) and report them
//! - drain outstanding work on shutdown within [`Config::grace`]
//!
//! ## High-level architecture
//! ```text
//! register / unregister ──► SubscriberRegistry (RwLock, held only for the access)
//!
//! publish(Event):
//!   Arc<Event> + registry.snapshot()
//!       │
//!       ├──► Delivery(sub 1, ev) ─┐
//!       ├──► Delivery(sub 2, ev) ─┼──► [bounded queue] ──► worker 1..N ──► sub.on_event(&ev)
//!       └──► Delivery(sub K, ev) ─┘                                 └──► failures ──► ReportBus
//!
//! shutdown():
//!   close queue ──► publish() now returns DispatchError::Closed
//!               └─► wait up to grace for queued + in-flight deliveries
//!                      ├─ Ok (all drained)     → Ok(())
//!                      └─ Timeout exceeded     → cancel + abort workers
//!                                                → DispatchError::GraceExceeded
//! ```
//!
//! ## Guarantees
//! - Each subscriber registered when `publish` takes its snapshot gets the event exactly once.
//! - Submission follows registration order; completion order is unspecified.
//! - Subscribers registered after the snapshot do not receive that event.
//! - Unregistering concurrently with `publish` may or may not affect that publish.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use orderbus::{Config, Dispatcher, Event, InventoryReactor, OrderStatus, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inventory = Arc::new(InventoryReactor::new());
//!     let dispatcher = Dispatcher::builder(Config::default())
//!         .with_subscribers(vec![inventory.clone() as Arc<dyn Subscribe>])
//!         .build();
//!
//!     let ev = Event::new("A-1", OrderStatus::PendingPayment, OrderStatus::Paid);
//!     dispatcher.publish(ev).await?;
//!
//!     dispatcher.shutdown().await?;
//!     assert_eq!(inventory.deductions().len(), 1);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OnceCell, broadcast, mpsc};

use crate::core::{builder::DispatcherBuilder, config::Config, pool::WorkerPool, shutdown};
use crate::error::DispatchError;
use crate::events::{DeliveryReport, Event, ReportBus};
use crate::subscribers::{Subscribe, SubscriberRegistry};

/// Publishes order events to registered subscribers on a bounded worker pool.
pub struct Dispatcher {
    cfg: Config,
    registry: SubscriberRegistry,
    pool: WorkerPool,
    reports: ReportBus,
    drained: OnceCell<Result<(), DispatchError>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no subscribers and starts its worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: Config) -> Self {
        let reports = ReportBus::new(cfg.report_capacity_clamped());
        let pool = WorkerPool::start(
            cfg.workers_clamped(),
            cfg.queue_capacity_clamped(),
            cfg.timeout(),
            reports.clone(),
        );
        Self {
            cfg,
            registry: SubscriberRegistry::new(),
            pool,
            reports,
            drained: OnceCell::new(),
        }
    }

    /// Returns a builder for wiring subscribers at construction.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Returns the configuration this dispatcher was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Adds `sub` unless the same instance is already registered.
    ///
    /// Returns `true` if it was added.
    pub fn register(&self, sub: Arc<dyn Subscribe>) -> bool {
        let name = sub.name();
        let added = self.registry.register(sub);
        if added {
            tracing::debug!(subscriber = name, "subscriber registered");
        }
        added
    }

    /// Removes `sub` if registered; a no-op otherwise.
    ///
    /// Returns `true` if it was removed.
    pub fn unregister(&self, sub: &Arc<dyn Subscribe>) -> bool {
        let removed = self.registry.unregister(sub);
        if removed {
            tracing::debug!(subscriber = sub.name(), "subscriber unregistered");
        }
        removed
    }

    /// Publishes an event to every registered subscriber.
    ///
    /// Returns the number of deliveries submitted once they are all enqueued.
    /// Waits only for queue space, never for a subscriber to run.
    ///
    /// ### Errors
    /// [`DispatchError::Closed`] after [`shutdown`](Self::shutdown); nothing is submitted.
    pub async fn publish(&self, event: Event) -> Result<usize, DispatchError> {
        self.publish_arc(Arc::new(event)).await
    }

    /// Publishes a pre-allocated `Arc<Event>` to every registered subscriber.
    ///
    /// Same semantics as [`publish`](Self::publish) without the extra allocation.
    pub async fn publish_arc(&self, event: Arc<Event>) -> Result<usize, DispatchError> {
        let tx = self.pool.sender().ok_or(DispatchError::Closed)?;
        let subs = self.registry.snapshot();

        let mut submitted = 0;
        for sub in subs {
            let delivery = self.pool.delivery(sub, Arc::clone(&event));
            if tx.send(delivery).await.is_err() {
                return Err(DispatchError::Closed);
            }
            submitted += 1;
        }
        tracing::trace!(seq = event.seq, order = %event.order_id, submitted, "event published");
        Ok(submitted)
    }

    /// Publishes without ever waiting for queue space.
    ///
    /// - Uses `try_send` per subscriber
    /// - On queue full: drops the delivery for that subscriber only and publishes
    ///   a [`ReportKind::Overflow`](crate::ReportKind::Overflow) report
    ///
    /// Returns the number of deliveries actually submitted.
    ///
    /// ### Errors
    /// [`DispatchError::Closed`] after [`shutdown`](Self::shutdown).
    pub fn try_publish(&self, event: Event) -> Result<usize, DispatchError> {
        let event = Arc::new(event);
        let tx = self.pool.sender().ok_or(DispatchError::Closed)?;

        let mut submitted = 0;
        for sub in self.registry.snapshot() {
            match tx.try_send(self.pool.delivery(sub, Arc::clone(&event))) {
                Ok(()) => submitted += 1,
                Err(mpsc::error::TrySendError::Full(dropped)) => {
                    tracing::warn!(
                        subscriber = dropped.subscriber(),
                        seq = event.seq,
                        "delivery queue full; event dropped for subscriber"
                    );
                    self.reports.publish(DeliveryReport::overflow(
                        dropped.subscriber(),
                        event.seq,
                        "queue full",
                    ));
                }
                Err(mpsc::error::TrySendError::Closed(_)) => return Err(DispatchError::Closed),
            }
        }
        Ok(submitted)
    }

    /// Stops accepting events and drains outstanding deliveries within [`Config::grace`].
    ///
    /// Every delivery queued or running when this is called is allowed to
    /// finish. Only the first call drains. A call made while that drain is
    /// running waits for it, and every later call returns its outcome again
    /// without doing any work.
    ///
    /// ### Errors
    /// [`DispatchError::GraceExceeded`] if the drain ran past the grace period;
    /// the remaining work is abandoned and the dispatcher stays closed.
    pub async fn shutdown(&self) -> Result<(), DispatchError> {
        self.shutdown_within(self.cfg.grace).await
    }

    /// Same as [`shutdown`](Self::shutdown) with a caller-supplied drain bound.
    ///
    /// The bound only applies if this call is the one that drains.
    pub async fn shutdown_within(&self, grace: Duration) -> Result<(), DispatchError> {
        self.drained
            .get_or_init(|| self.drain_once(grace))
            .await
            .clone()
    }

    async fn drain_once(&self, grace: Duration) -> Result<(), DispatchError> {
        self.pool.close();
        tracing::info!(pending = self.pool.pending(), grace = ?grace, "dispatcher shutting down");

        let res = self.pool.drain(grace).await;
        match &res {
            Ok(()) => tracing::info!("dispatcher drained"),
            Err(e) => {
                tracing::error!(error = %e, label = e.as_label(), "dispatcher drain incomplete")
            }
        }
        res
    }

    /// Waits for a termination signal, then runs [`shutdown`](Self::shutdown).
    ///
    /// If no signal listener can be installed, shuts down immediately.
    pub async fn shutdown_on_signal(&self) -> Result<(), DispatchError> {
        match shutdown::wait_for_signal().await {
            Ok(sig) => tracing::info!(signal = %sig, "termination signal received"),
            Err(e) => tracing::error!(error = %e, "cannot listen for signals; shutting down now"),
        }
        self.shutdown().await
    }

    /// Returns a receiver for delivery failure reports published from now on.
    pub fn reports(&self) -> broadcast::Receiver<DeliveryReport> {
        self.reports.subscribe()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns true if `sub` is registered.
    pub fn contains(&self, sub: &Arc<dyn Subscribe>) -> bool {
        self.registry.contains(sub)
    }

    /// Deliveries submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pool.pending()
    }

    /// Returns true once shutdown has started.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Size of the worker pool.
    pub fn workers(&self) -> usize {
        self.pool.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubscriberError;
    use crate::events::{OrderStatus, ReportKind};
    use crate::subscribers::{InventoryReactor, LogisticsReactor};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
        delay: Duration,
    }

    impl Counter {
        fn slow(delay: Duration) -> Self {
            Self {
                hits: AtomicUsize::new(0),
                delay,
            }
        }
        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _ev: &Event) -> Result<(), SubscriberError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Failing;

    #[async_trait]
    impl Subscribe for Failing {
        async fn on_event(&self, _ev: &Event) -> Result<(), SubscriberError> {
            Err(SubscriberError::Unavailable {
                service: "ledger",
                reason: "connection refused".into(),
            })
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Panicking;

    #[async_trait]
    impl Subscribe for Panicking {
        async fn on_event(&self, _ev: &Event) -> Result<(), SubscriberError> {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    /// Blocks each delivery until a permit is added.
    struct Gated(Arc<Semaphore>);

    #[async_trait]
    impl Subscribe for Gated {
        async fn on_event(&self, _ev: &Event) -> Result<(), SubscriberError> {
            let permit = self.0.acquire().await.map_err(|e| SubscriberError::Fail {
                reason: e.to_string(),
            })?;
            permit.forget();
            Ok(())
        }
        fn name(&self) -> &'static str {
            "gated"
        }
    }

    /// Tracks the highest number of simultaneous invocations.
    #[derive(Default)]
    struct Gauge {
        now: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Gauge {
        async fn on_event(&self, _ev: &Event) -> Result<(), SubscriberError> {
            let n = self.now.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(n, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.now.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    type Log = Arc<Mutex<Vec<(u64, &'static str)>>>;

    /// Appends `(event seq, own name)` to a shared log.
    struct Recorder {
        name: &'static str,
        log: Log,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) -> Result<(), SubscriberError> {
            self.log.lock().unwrap().push((ev.seq, self.name));
            Ok(())
        }
        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn paid(order: &str) -> Event {
        Event::new(order, OrderStatus::PendingPayment, OrderStatus::Paid)
    }

    fn with_workers(workers: usize) -> Config {
        Config {
            workers,
            ..Config::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_subscriber_gets_each_event_once() {
        let d = Dispatcher::new(with_workers(3));
        let counters: Vec<Arc<Counter>> = (0..3).map(|_| Arc::new(Counter::default())).collect();
        for c in &counters {
            assert!(d.register(c.clone()));
        }

        for i in 0..5 {
            assert_eq!(d.publish(paid(&format!("o-{i}"))).await, Ok(3));
        }
        d.shutdown().await.unwrap();

        for c in &counters {
            assert_eq!(c.hits(), 5);
        }
        assert_eq!(d.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_duplicate_register_delivers_once() {
        let d = Dispatcher::new(with_workers(2));
        let c = Arc::new(Counter::default());
        let sub: Arc<dyn Subscribe> = c.clone();
        assert!(d.register(Arc::clone(&sub)));
        assert!(!d.register(Arc::clone(&sub)));
        assert_eq!(d.len(), 1);

        assert_eq!(d.publish(paid("o-1")).await, Ok(1));
        d.shutdown().await.unwrap();
        assert_eq!(c.hits(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unregistered_before_publish_gets_nothing() {
        let d = Dispatcher::new(with_workers(2));
        let kept = Arc::new(Counter::default());
        let removed = Arc::new(Counter::default());
        let removed_sub: Arc<dyn Subscribe> = removed.clone();

        d.register(kept.clone());
        d.register(Arc::clone(&removed_sub));
        assert!(d.unregister(&removed_sub));
        assert!(!d.unregister(&removed_sub));
        assert!(!d.contains(&removed_sub));

        d.publish(paid("o-1")).await.unwrap();
        d.shutdown().await.unwrap();

        assert_eq!(kept.hits(), 1);
        assert_eq!(removed.hits(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_publish_does_not_wait_for_subscribers() {
        let d = Dispatcher::new(with_workers(2));
        let gate = Arc::new(Semaphore::new(0));
        d.register(Arc::new(Gated(Arc::clone(&gate))));

        let submitted = tokio::time::timeout(Duration::from_secs(1), d.publish(paid("o-1")))
            .await
            .expect("publish must not wait for the subscriber");
        assert_eq!(submitted, Ok(1));
        assert_eq!(d.pending(), 1);

        gate.add_permits(1);
        d.shutdown().await.unwrap();
        assert_eq!(d.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failures_are_isolated_and_reported() {
        let d = Dispatcher::new(with_workers(2));
        let mut reports = d.reports();
        let before = Arc::new(Counter::default());
        let after = Arc::new(Counter::default());

        d.register(before.clone());
        d.register(Arc::new(Failing));
        d.register(Arc::new(Panicking));
        d.register(after.clone());

        let ev = paid("o-1");
        let seq = ev.seq;
        assert_eq!(d.publish(ev).await, Ok(4));
        assert_eq!(d.publish(paid("o-2")).await, Ok(4));
        d.shutdown().await.unwrap();

        assert_eq!(before.hits(), 2);
        assert_eq!(after.hits(), 2);

        let mut kinds = Vec::new();
        while let Ok(r) = reports.try_recv() {
            if r.event_seq == seq {
                kinds.push((r.subscriber, r.kind));
            }
        }
        kinds.sort_by_key(|(name, _)| *name);
        assert_eq!(
            kinds,
            vec![
                ("failing", ReportKind::Failed),
                ("panicking", ReportKind::Panicked)
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_only_matching_transition_reacts() {
        let d = Dispatcher::new(with_workers(2));
        let inventory = Arc::new(InventoryReactor::new());
        let logistics = Arc::new(LogisticsReactor::new());
        d.register(inventory.clone());
        d.register(logistics.clone());

        d.publish(paid("A-1")).await.unwrap();
        d.shutdown().await.unwrap();

        assert_eq!(inventory.deductions().len(), 1);
        assert!(logistics.manifest().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishers_count_exactly() {
        let d = Arc::new(Dispatcher::new(with_workers(5)));
        let c = Arc::new(Counter::default());
        d.register(c.clone());

        let mut handles = Vec::new();
        for caller in 0..10 {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                for i in 0..10 {
                    d.publish(paid(&format!("o-{caller}-{i}"))).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        d.shutdown().await.unwrap();

        assert_eq!(c.hits(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_drains_queue_then_rejects() {
        let d = Dispatcher::new(with_workers(1));
        let c = Arc::new(Counter::slow(Duration::from_millis(10)));
        d.register(c.clone());

        for i in 0..10 {
            d.publish(paid(&format!("o-{i}"))).await.unwrap();
        }
        d.shutdown().await.unwrap();
        assert_eq!(c.hits(), 10);
        assert!(d.is_closed());

        assert_eq!(d.publish(paid("late")).await, Err(DispatchError::Closed));
        assert_eq!(d.try_publish(paid("late")), Err(DispatchError::Closed));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(c.hits(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repeated_shutdown_is_noop() {
        let d = Dispatcher::new(Config::default());
        d.shutdown().await.unwrap();
        d.shutdown().await.unwrap();
        assert!(d.is_closed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_reports_grace_exceeded() {
        let d = Dispatcher::new(with_workers(1));
        d.register(Arc::new(Counter::slow(Duration::from_secs(30))));
        for i in 0..3 {
            d.publish(paid(&format!("o-{i}"))).await.unwrap();
        }

        let err = d
            .shutdown_within(Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            DispatchError::GraceExceeded { grace, pending } => {
                assert_eq!(grace, Duration::from_millis(50));
                assert_eq!(pending, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(d.publish(paid("late")).await, Err(DispatchError::Closed));
        assert_eq!(
            d.shutdown().await,
            Err(DispatchError::GraceExceeded {
                grace: Duration::from_millis(50),
                pending: 3
            })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_bounds_concurrency() {
        let d = Dispatcher::new(with_workers(2));
        let gauge = Arc::new(Gauge::default());
        d.register(gauge.clone());

        for i in 0..8 {
            d.publish(paid(&format!("o-{i}"))).await.unwrap();
        }
        d.shutdown().await.unwrap();

        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 2, "peak concurrency {peak}");
        assert_eq!(d.workers(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_delivery_times_out_and_pool_continues() {
        let cfg = Config {
            workers: 1,
            delivery_timeout: Duration::from_millis(50),
            ..Config::default()
        };
        let d = Dispatcher::new(cfg);
        let mut reports = d.reports();
        let stuck = Arc::new(Counter::slow(Duration::from_secs(30)));
        d.register(stuck.clone());

        d.publish(paid("o-1")).await.unwrap();
        let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.kind, ReportKind::TimedOut);
        assert_eq!(report.subscriber, "counter");

        let sub: Arc<dyn Subscribe> = stuck;
        d.unregister(&sub);
        let fast = Arc::new(Counter::default());
        d.register(fast.clone());
        d.publish(paid("o-2")).await.unwrap();
        d.shutdown().await.unwrap();
        assert_eq!(fast.hits(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_try_publish_reports_overflow() {
        let cfg = Config {
            workers: 1,
            queue_capacity: 1,
            ..Config::default()
        };
        let d = Dispatcher::new(cfg);
        let mut reports = d.reports();
        let gate = Arc::new(Semaphore::new(0));
        d.register(Arc::new(Gated(Arc::clone(&gate))));

        let submitted: usize = (0..3)
            .map(|i| d.try_publish(paid(&format!("o-{i}"))).unwrap())
            .sum();
        assert!((1..=2).contains(&submitted), "submitted {submitted}");

        let report = reports.try_recv().unwrap();
        assert_eq!(report.kind, ReportKind::Overflow);
        assert_eq!(report.subscriber, "gated");
        assert_eq!(&*report.reason, "queue full");

        gate.add_permits(3);
        d.shutdown().await.unwrap();
        assert_eq!(d.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_publish_without_subscribers() {
        let d = Dispatcher::new(Config::default());
        assert!(d.is_empty());
        assert_eq!(d.publish(paid("o-1")).await, Ok(0));
        d.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submission_follows_registration_and_publish_order() {
        let d = Dispatcher::new(with_workers(1));
        let log = Log::default();
        for name in ["a", "b", "c"] {
            d.register(Arc::new(Recorder {
                name,
                log: Arc::clone(&log),
            }));
        }

        let mut seqs = Vec::new();
        for i in 0..3 {
            let ev = paid(&format!("o-{i}"));
            seqs.push(ev.seq);
            d.publish(ev).await.unwrap();
        }
        d.shutdown().await.unwrap();

        let expected: Vec<(u64, &'static str)> = seqs
            .iter()
            .flat_map(|&seq| ["a", "b", "c"].map(|name| (seq, name)))
            .collect();
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_shutdown_waits_for_the_drain() {
        let d = Arc::new(Dispatcher::new(with_workers(1)));
        let gate = Arc::new(Semaphore::new(0));
        d.register(Arc::new(Gated(Arc::clone(&gate))));
        d.publish(paid("o-1")).await.unwrap();

        let first = tokio::spawn({
            let d = Arc::clone(&d);
            async move { d.shutdown().await }
        });
        while !d.is_closed() {
            tokio::task::yield_now().await;
        }

        let second = tokio::spawn({
            let d = Arc::clone(&d);
            async move {
                let res = d.shutdown().await;
                (res, d.pending())
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!second.is_finished(), "second shutdown returned before the drain");

        gate.add_permits(1);
        assert_eq!(first.await.unwrap(), Ok(()));
        assert_eq!(second.await.unwrap(), (Ok(()), 0));
    }
}
