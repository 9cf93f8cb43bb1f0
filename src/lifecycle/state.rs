//! Application state machine
//!
//! ```text
//!            ┌──► Running ──┐
//! Initial ───┤              ├──► Shutdown ──► Terminated
//!            └──► Started ──┘
//! ```
//!
//! `Initial → Running` and `Initial → Started` are compare-and-swap
//! transitions, so only one of them can ever win. `Shutdown` can be entered
//! from any state except `Terminated`, which is final.

use std::sync::atomic::{AtomicU8, Ordering};
use strum_macros::{Display, FromRepr, IntoStaticStr};

/// The states an [`Application`](super::Application) moves through
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, FromRepr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum State {
    /// Never assigned by the application; decoded from a corrupt value
    Invalid = 0,
    /// Accepting plugins; no phase has begun
    Initial = 1,
    /// `Run` has been invoked
    Running = 2,
    /// `Start` has been invoked
    Started = 3,
    /// Reverse teardown is in progress (or has finished)
    Shutdown = 4,
    /// Teardown finished and the terminal error was reported
    Terminated = 5,
}

impl State {
    /// Returns `true` once no further transitions are legal
    pub fn is_terminal(self) -> bool {
        self == State::Terminated
    }
}

/// Atomic holder for [`State`]
#[derive(Debug)]
pub(crate) struct StateCell {
    value: AtomicU8,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            value: AtomicU8::new(State::Initial as u8),
        }
    }

    pub(crate) fn load(&self) -> State {
        decode(self.value.load(Ordering::Acquire))
    }

    /// Moves `from → to` only if the current state is `from`.
    ///
    /// On failure the observed state is returned.
    pub(crate) fn transition(&self, from: State, to: State) -> Result<(), State> {
        self.value
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(decode)
    }

    /// Enters `Shutdown` unless already `Terminated`; returns the previous state.
    pub(crate) fn begin_shutdown(&self) -> State {
        let prev = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (cur != State::Terminated as u8).then_some(State::Shutdown as u8)
            });
        match prev {
            Ok(cur) | Err(cur) => decode(cur),
        }
    }

    /// Enters `Terminated`; returns the previous state.
    pub(crate) fn terminate(&self) -> State {
        decode(self.value.swap(State::Terminated as u8, Ordering::AcqRel))
    }
}

fn decode(raw: u8) -> State {
    State::from_repr(raw).unwrap_or(State::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_initial() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), State::Initial);
    }

    #[test]
    fn only_one_phase_can_win() {
        let cell = StateCell::new();
        assert!(cell.transition(State::Initial, State::Running).is_ok());
        assert_eq!(
            cell.transition(State::Initial, State::Started),
            Err(State::Running)
        );
        assert_eq!(cell.load(), State::Running);
    }

    #[test]
    fn shutdown_never_leaves_terminated() {
        let cell = StateCell::new();
        assert_eq!(cell.begin_shutdown(), State::Initial);
        assert_eq!(cell.load(), State::Shutdown);

        assert_eq!(cell.terminate(), State::Shutdown);
        assert_eq!(cell.begin_shutdown(), State::Terminated);
        assert_eq!(cell.load(), State::Terminated);
        assert!(cell.load().is_terminal());
    }

    #[test]
    fn states_are_ordered_like_the_lifecycle() {
        assert!(State::Invalid < State::Initial);
        assert!(State::Initial < State::Running);
        assert!(State::Shutdown < State::Terminated);
        assert_eq!(State::Terminated.to_string(), "terminated");
    }
}
