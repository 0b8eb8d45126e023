//! Controller-facing reply taxonomy.
//!
//! Rejections are data, not errors: a transition attempted from the wrong
//! state comes back as `Failed` carrying the observed state, and the caller
//! decides between retry (non-terminal) and teardown (terminal).

use serde::{Deserialize, Serialize};

use crate::action::ActionResult;
use crate::state::SessionState;

/// Reply to a result poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResultReply {
    /// A result was claimed by this caller. `result` is absent only when a
    /// concurrent caller won the destructive read first.
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<ActionResult>,
    },
    /// No result to deliver; `state` says why (Idle/Running: not yet,
    /// Finish/Fatal: never again).
    Failed { state: SessionState },
    /// No such session.
    NotExist,
}

/// Reply to an instruction submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstructionReply {
    /// The instruction was accepted and the session moved to Running.
    Success,
    /// Rejected; the session was not in `Result` state.
    Failed { state: SessionState },
    /// No such session.
    NotExist,
}

#[cfg(test)]
#[path = "reply_tests.rs"]
mod tests;
