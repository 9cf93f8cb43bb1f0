//! Phase reporting hook
//!
//! The hook is a single observability callback. It is told about every phase
//! boundary that carries news (a failure, or the final termination) and can
//! never veto a transition.

use super::LifecycleError;
use arc_swap::ArcSwap;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// Labels reported to the [`Hook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumIter)]
pub enum Phase {
    #[strum(serialize = "initialization")]
    Initialization,
    #[strum(serialize = "running")]
    Running,
    #[strum(serialize = "startup")]
    Startup,
    #[strum(serialize = "shutdown")]
    Shutdown,
    #[strum(serialize = "terminated")]
    Terminated,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Callback invoked with a phase label and the error (if any) seen there
pub type Hook = Arc<dyn Fn(Phase, Option<&LifecycleError>) + Send + Sync>;

/// Returns a hook that does nothing
pub fn noop_hook() -> Hook {
    Arc::new(|_: Phase, _: Option<&LifecycleError>| {})
}

/// Returns a hook that forwards every report to `tracing`
///
/// This is usually installed by a logging plugin during its own
/// `initialize`, or directly through
/// [`ApplicationBuilder::hook`](super::ApplicationBuilder::hook).
pub fn logging_hook() -> Hook {
    Arc::new(log_phase)
}

fn log_phase(phase: Phase, err: Option<&LifecycleError>) {
    match (phase, err) {
        (Phase::Terminated, None) => {
            tracing::info!(phase = %phase, "Application terminated");
        }
        (Phase::Terminated, Some(err)) => {
            tracing::error!(
                phase = %phase,
                label = err.as_label(),
                "Application terminated with error: {}",
                err
            );
        }
        (_, Some(err)) => {
            tracing::error!(
                phase = %phase,
                label = err.as_label(),
                "Lifecycle phase failed: {}",
                err
            );
        }
        (_, None) => {
            tracing::debug!(phase = %phase, "Lifecycle phase reported");
        }
    }
}

struct Slot(Hook);

/// Lock-free holder for the current hook; the last write wins
pub(crate) struct HookCell {
    current: ArcSwap<Slot>,
}

impl HookCell {
    pub(crate) fn new(hook: Hook) -> Self {
        Self {
            current: ArcSwap::from_pointee(Slot(hook)),
        }
    }

    pub(crate) fn replace(&self, hook: Hook) {
        self.current.store(Arc::new(Slot(hook)));
    }

    pub(crate) fn emit(&self, phase: Phase, err: Option<&LifecycleError>) {
        let slot = self.current.load_full();
        (slot.0)(phase, err);
    }
}
