//! Atomic store transitions.

use serde::{Deserialize, Serialize};

use crate::action::ActionResult;
use crate::instruction::Instruction;
use crate::state::SessionState;

/// One guarded, atomic multi-field write against a session entry.
///
/// The store applies the whole update under a single lock acquisition: the
/// state check, the state advance, and any field writes/clears succeed or
/// fail together, so no reader ever observes a torn combination such as a
/// fresh response alongside a stale state.
///
/// An empty `expect` list makes the update unconditional; only the forced
/// paths use that (worker crash to `Fatal`, registry stop to `Finish`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// States the entry must currently be in for the update to apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expect: Vec<SessionState>,
    /// State the entry moves to.
    pub next: SessionState,
    /// Instruction to write alongside the state advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Instruction>,
    /// Response to write alongside the state advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ActionResult>,
    /// Drop any pending instruction as part of the same write.
    #[serde(default)]
    pub clear_instruction: bool,
    /// Drop any pending response as part of the same write.
    #[serde(default)]
    pub clear_response: bool,
}

impl StateUpdate {
    /// Unconditional transition to `next`; chain `expecting` to guard it.
    pub fn to(next: SessionState) -> Self {
        StateUpdate {
            expect: Vec::new(),
            next,
            instruction: None,
            response: None,
            clear_instruction: false,
            clear_response: false,
        }
    }

    pub fn expecting(mut self, states: impl IntoIterator<Item = SessionState>) -> Self {
        self.expect = states.into_iter().collect();
        self
    }

    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instruction = Some(instruction);
        self
    }

    pub fn with_response(mut self, response: ActionResult) -> Self {
        self.response = Some(response);
        self
    }

    pub fn clearing_instruction(mut self) -> Self {
        self.clear_instruction = true;
        self
    }

    pub fn clearing_response(mut self) -> Self {
        self.clear_response = true;
        self
    }

    /// Whether `observed` satisfies the guard.
    pub fn admits(&self, observed: SessionState) -> bool {
        self.expect.is_empty() || self.expect.contains(&observed)
    }
}

/// Outcome of applying a [`StateUpdate`]. Conflicts are ordinary data;
/// callers map them onto the `Failed(state)` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transition {
    /// The guard admitted the observed state and the write applied.
    Applied,
    /// The entry was in `state`, which the guard does not admit. Nothing
    /// was written.
    Conflict { state: SessionState },
    /// No entry for this session id.
    Missing,
}

impl Transition {
    pub fn applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
