//! # Process termination signals.
//!
//! [`wait_for_signal`] completes when the process is asked to stop, and
//! reports which signal arrived so the dispatcher can log it before draining.
//!
//! - **Unix**: `SIGINT`, `SIGTERM`, `SIGQUIT`
//! - **Other platforms**: Ctrl-C

use std::fmt;

/// Termination signal observed by [`wait_for_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C / `SIGINT`.
    Interrupt,
    /// `SIGTERM` (systemd, Kubernetes, plain `kill`).
    Terminate,
    /// `SIGQUIT`.
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "interrupt",
            ShutdownSignal::Terminate => "terminate",
            ShutdownSignal::Quit => "quit",
        })
    }
}

/// Waits for a termination signal.
///
/// Returns `Err` if a signal listener cannot be installed.
///
/// Use it directly when something else has to happen between the signal and
/// [`Dispatcher::shutdown`](crate::Dispatcher::shutdown):
/// ```no_run
/// use orderbus::{Config, Dispatcher, ShutdownSignal, wait_for_signal};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::new(Config::default());
/// let sig: ShutdownSignal = wait_for_signal().await?;
/// println!("stopping on {sig}");
/// dispatcher.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let sig = tokio::select! {
        _ = sigint.recv()  => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigquit.recv() => ShutdownSignal::Quit,
    };
    Ok(sig)
}

/// Waits for a termination signal.
///
/// Returns `Err` if the Ctrl-C listener cannot be installed.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownSignal::Interrupt)
}
