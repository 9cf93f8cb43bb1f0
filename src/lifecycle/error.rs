//! Lifecycle-specific error types

use thiserror::Error;

/// Errors that can reach the hook and the termination action
///
/// There are exactly two categories: guard violations raised by the
/// [`Application`](super::Application) itself, and errors returned by a
/// plugin's phase method. Neither is retried.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `Initialize` was called after `Run` or `Start` began
    #[error("cannot initialize application after startup")]
    InitializeAfterStartup,

    /// Both `Run` and `Start` were requested on the same application
    #[error("cannot start and run an application in the same execution context")]
    RunOrStart,

    /// A plugin's phase method returned an error
    #[error(transparent)]
    Plugin(#[from] anyhow::Error),
}

impl LifecycleError {
    /// Wrap an arbitrary plugin failure
    pub fn plugin(err: impl Into<anyhow::Error>) -> Self {
        Self::Plugin(err.into())
    }

    /// Returns `true` for errors raised by the state-machine guard
    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::InitializeAfterStartup | Self::RunOrStart)
    }

    /// Returns a short stable label (snake_case) for use in logs
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InitializeAfterStartup => "initialize_after_startup",
            Self::RunOrStart => "run_or_start",
            Self::Plugin(_) => "plugin_failed",
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_errors_keep_their_message() {
        let err = LifecycleError::plugin(anyhow::anyhow!("something went wrong"));
        assert_eq!(err.to_string(), "something went wrong");
        assert_eq!(err.as_label(), "plugin_failed");
        assert!(!err.is_guard_violation());
    }

    #[test]
    fn guard_violations_are_labelled() {
        assert!(LifecycleError::RunOrStart.is_guard_violation());
        assert!(LifecycleError::InitializeAfterStartup.is_guard_violation());
        assert_eq!(
            LifecycleError::InitializeAfterStartup.to_string(),
            "cannot initialize application after startup"
        );
    }
}
