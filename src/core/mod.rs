//! Dispatcher core: worker pool, delivery and lifecycle.
//!
//! The public API from this module is [`Dispatcher`] (with its
//! [`DispatcherBuilder`]), [`Config`] and [`wait_for_signal`].
//!
//! Internal modules:
//! - [`runner`]: runs one delivery with timeout/panic containment and failure reporting;
//! - [`pool`]: fixed-size worker pool over one bounded queue;
//! - [`dispatcher`]: registry, publish fan-out, graceful shutdown;
//! - [`shutdown`]: cross-platform termination signal handling;
//! - [`builder`]: wiring of initial subscribers.

mod builder;
mod config;
mod dispatcher;
mod pool;
mod runner;
mod shutdown;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use shutdown::{ShutdownSignal, wait_for_signal};
