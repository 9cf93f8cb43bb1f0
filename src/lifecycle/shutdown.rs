//! Shutdown coordination
//!
//! Two producers can ask for teardown: an explicit
//! [`Application::shutdown`](super::Application::shutdown) call and an OS
//! termination signal. Both converge on [`ShutdownCoordinator`], whose trigger
//! is idempotent: the first request wins, later requests are dropped and never
//! block their caller.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use strum_macros::Display;
use tokio_util::sync::CancellationToken;

/// Termination signals recognized by the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Signal {
    /// `SIGINT` (Ctrl+C)
    #[strum(serialize = "SIGINT")]
    Interrupt,
    /// `SIGTERM`
    #[strum(serialize = "SIGTERM")]
    Terminate,
    /// A caller-supplied signal source completed
    #[strum(serialize = "external")]
    External,
}

/// What started the teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `Application::shutdown` was called (phase completed, failed, or guard violation)
    Explicit,
    /// A termination signal arrived
    Signal(Signal),
}

pub(crate) type SignalFuture = Pin<Box<dyn Future<Output = Signal> + Send>>;

/// Wait for `SIGTERM` or `SIGINT`
///
/// Returns `Err` if the signal handlers cannot be installed.
///
/// # Example
///
/// ```rust,no_run
/// use plugin_lifecycle::lifecycle::termination_signal;
///
/// # async fn demo() -> std::io::Result<()> {
/// let signal = termination_signal().await?;
/// println!("received {signal}");
/// # Ok(())
/// # }
/// ```
#[cfg(unix)]
pub async fn termination_signal() -> std::io::Result<Signal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => Ok(Signal::Interrupt),
        _ = sigterm.recv() => Ok(Signal::Terminate),
    }
}

/// Wait for Ctrl+C
#[cfg(not(unix))]
pub async fn termination_signal() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await?;
    Ok(Signal::Interrupt)
}

/// OS signal source used by the shutdown listener
///
/// When the handlers cannot be installed the failure is logged and the
/// future never completes, leaving the explicit trigger as the only way out.
pub(crate) fn os_signal() -> SignalFuture {
    Box::pin(async {
        match termination_signal().await {
            Ok(signal) => {
                tracing::info!(signal = %signal, "Received termination signal");
                signal
            }
            Err(e) => {
                tracing::warn!("Failed to install termination signal handlers: {}", e);
                std::future::pending().await
            }
        }
    })
}

/// Adapts a caller-supplied future into a signal source
pub(crate) fn external_signal<F>(fut: F) -> SignalFuture
where
    F: Future<Output = ()> + Send + 'static,
{
    Box::pin(async move {
        fut.await;
        tracing::info!(signal = %Signal::External, "Received termination signal");
        Signal::External
    })
}

/// Rendezvous between shutdown requests, the teardown listener and waiters
#[derive(Debug)]
pub(crate) struct ShutdownCoordinator {
    trigger: CancellationToken,
    done: CancellationToken,
    cause: OnceLock<Trigger>,
}

impl ShutdownCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            trigger: CancellationToken::new(),
            done: CancellationToken::new(),
            cause: OnceLock::new(),
        }
    }

    /// Records `cause` if nothing has yet and fires the trigger.
    ///
    /// Returns `true` for the request that actually started the shutdown.
    pub(crate) fn request(&self, cause: Trigger) -> bool {
        let first = self.cause.set(cause).is_ok();
        self.trigger.cancel();
        first
    }

    /// Token the listener waits on
    pub(crate) fn trigger(&self) -> CancellationToken {
        self.trigger.clone()
    }

    pub(crate) fn is_triggered(&self) -> bool {
        self.trigger.is_cancelled()
    }

    pub(crate) fn cause(&self) -> Option<Trigger> {
        self.cause.get().copied()
    }

    /// Marks teardown as finished, releasing every waiter
    pub(crate) fn complete(&self) {
        self.done.cancel();
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Waits until teardown has finished
    pub(crate) async fn wait(&self) {
        self.done.cancelled().await;
    }
}
