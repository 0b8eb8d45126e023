//! Agent-chosen page instructions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One action for the worker to apply to its page.
///
/// `label` references an interactive element enumerated by the page marker
/// during the iteration that produced the screenshot the agent saw. Labels
/// are only meaningful within that one result; a navigation invalidates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Instruction {
    /// Click the labeled element.
    Click { label: u32 },
    /// Fill the labeled element with text, then press Enter.
    Type { label: u32, content: String },
    /// Do nothing for a fixed duration (page is still loading or animating).
    Wait,
    /// End the session normally.
    Finish,
}

impl Instruction {
    pub fn is_finish(&self) -> bool {
        matches!(self, Instruction::Finish)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Click { label } => write!(f, "Click({label})"),
            Instruction::Type { label, content } => {
                write!(f, "Type({label}, {:?})", content)
            }
            Instruction::Wait => f.write_str("Wait"),
            Instruction::Finish => f.write_str("Finish"),
        }
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod tests;
