//! Termination strategies
//!
//! The termination action is the last thing an [`Application`](super::Application)
//! does: it runs after teardown and after the hook has seen the terminal error.

use super::LifecycleError;

/// Final action executed with the terminal error
///
/// Any `Fn(Option<&LifecycleError>)` closure implements this trait, which is
/// how tests observe the terminal error without exiting the process.
pub trait Terminate: Send + Sync + 'static {
    fn terminate(&self, err: Option<&LifecycleError>);
}

impl<F> Terminate for F
where
    F: Fn(Option<&LifecycleError>) + Send + Sync + 'static,
{
    fn terminate(&self, err: Option<&LifecycleError>) {
        self(err)
    }
}

/// Production strategy: exit the process with `exit_code` when there is an error
///
/// A clean termination returns normally so the caller's `main` can unwind.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    exit_code: i32,
}

impl ProcessExit {
    /// `exit_code` must be non-zero; zero falls back to `1`
    pub fn new(exit_code: i32) -> Self {
        if exit_code == 0 {
            tracing::warn!("Exit code 0 would hide fatal errors; using 1");
            return Self { exit_code: 1 };
        }
        Self { exit_code }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl Default for ProcessExit {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Terminate for ProcessExit {
    fn terminate(&self, err: Option<&LifecycleError>) {
        if let Some(err) = err {
            tracing::error!(
                label = err.as_label(),
                exit_code = self.exit_code,
                "Fatal lifecycle error: {}",
                err
            );
            std::process::exit(self.exit_code);
        }
    }
}
