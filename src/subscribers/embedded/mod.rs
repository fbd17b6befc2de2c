//! # Built-in subscribers
//!
//! Small, self-contained reactions to order status changes. Each one filters
//! on a single transition and records its own side effects; none of them
//! share state with another.
//!
//! - [`InventoryReactor`]: `PendingPayment → Paid`, deducts stock.
//! - [`BillingReactor`]: `PendingPayment → Paid`, issues a [`Bill`].
//! - [`LogisticsReactor`]: `PendingDelivery → Delivered`, creates a [`Waybill`].
//! - [`NotificationReactor`]: `PendingDelivery → Delivered`, sends a [`Notice`].
//! - [`LogWriter`]: logs every event (demo/debug).

mod billing;
mod inventory;
mod log;
mod logistics;
mod notification;

pub use billing::{Bill, BillingReactor};
pub use inventory::InventoryReactor;
pub use log::LogWriter;
pub use logistics::{LogisticsReactor, Waybill};
pub use notification::{Notice, NotificationReactor};
