//! # Order Flow Example
//!
//! Walks two orders through their lifecycle and lets the built-in reactors
//! handle each transition on a pool of 5 workers.
//!
//! Order `A-1001` has a user and ships normally. Order `A-1002` has no user,
//! so the notification reactor fails; the failure is logged and reported
//! while every other reactor still runs.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example order_flow
//! ```

use std::sync::Arc;
use std::time::Duration;

use orderbus::{
    BillingReactor, Config, Dispatcher, InventoryReactor, LogWriter, LogisticsReactor,
    NotificationReactor, OrderService, OrderStatus, Subscribe,
};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config {
        workers: 5,
        grace: Duration::from_secs(5),
        delivery_timeout: Duration::from_secs(2),
        ..Config::default()
    };

    let inventory = Arc::new(InventoryReactor::new());
    let billing = Arc::new(BillingReactor::new());
    let logistics = Arc::new(LogisticsReactor::new());
    let notify = Arc::new(NotificationReactor::new());

    let subs: Vec<Arc<dyn Subscribe>> = vec![
        inventory.clone(),
        billing.clone(),
        logistics.clone(),
        notify.clone(),
        Arc::new(LogWriter::new()),
    ];
    let dispatcher = Dispatcher::builder(cfg).with_subscribers(subs).build();

    let mut reports = dispatcher.reports();
    let report_log = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(r) => println!(
                    "[report] {} subscriber={} event={} reason={}",
                    r.kind.as_label(),
                    r.subscriber,
                    r.event_seq,
                    r.reason
                ),
                Err(RecvError::Lagged(n)) => println!("[report] skipped {n} reports"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let orders = OrderService::new(Arc::clone(&dispatcher));
    let lifecycle = [
        (OrderStatus::PendingPayment, OrderStatus::Paid),
        (OrderStatus::Paid, OrderStatus::PendingDelivery),
        (OrderStatus::PendingDelivery, OrderStatus::Delivered),
    ];

    for (order, user) in [("A-1001", Some("u-42")), ("A-1002", None)] {
        orders.place(order);
        for (from, to) in lifecycle {
            let ev = orders.change_status(order, from, to, user).await?;
            println!("published {ev}");
        }
    }

    dispatcher.shutdown().await?;
    drop(dispatcher);
    drop(orders);
    report_log.await?;

    println!();
    println!("Summary:");
    println!(" ├─► Stock deductions: {}", inventory.deductions().len());
    println!(" ├─► Bills issued:     {}", billing.bills().len());
    println!(" ├─► Waybills:         {}", logistics.manifest().len());
    println!(" └─► Notices sent:     {}", notify.outbox().len());
    Ok(())
}
