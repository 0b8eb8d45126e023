//! Session state machine states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-process visible state of one session.
///
/// The store entry's `state` field is the single source of truth both the
/// controller and the worker agree on. Every transition between these states
/// is a single atomic multi-field store write, guarded by a check of the
/// prior state (see [`crate::StateUpdate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Seeded at creation; the worker has not started its first iteration.
    Idle,
    /// The worker owns the turn: it is navigating or applying an instruction.
    Running,
    /// A fresh result is published; the controller owns the turn.
    Result,
    /// Normal termination. No further instructions are accepted.
    Finish,
    /// The worker hit an unrecoverable error. No further instructions are accepted.
    Fatal,
}

impl SessionState {
    /// Terminal states end the session; the registry record and store entry
    /// are reclaimed exactly once after one is observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finish | SessionState::Fatal)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Result => "Result",
            SessionState::Finish => "Finish",
            SessionState::Fatal => "Fatal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Finish.is_terminal());
        assert!(SessionState::Fatal.is_terminal());
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Running.is_terminal());
        assert!(!SessionState::Result.is_terminal());
    }

    #[test]
    fn test_serializes_by_variant_name() {
        let json = serde_json::to_string(&SessionState::Fatal).unwrap();
        assert_eq!(json, "\"Fatal\"");
        let back: SessionState = serde_json::from_str("\"Result\"").unwrap();
        assert_eq!(back, SessionState::Result);
    }

    #[test]
    fn test_display_matches_wire_name() {
        for state in [
            SessionState::Idle,
            SessionState::Running,
            SessionState::Result,
            SessionState::Finish,
            SessionState::Fatal,
        ] {
            let wire = serde_json::to_string(&state).unwrap();
            assert_eq!(wire, format!("\"{}\"", state));
        }
    }
}
