//! In-process store backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use pagepilot_protocols::{ActionResult, Instruction, SessionState, StateUpdate, Transition};

use crate::error::StoreError;
use crate::store::SessionStore;

#[derive(Debug, Clone)]
struct SessionEntry {
    state: SessionState,
    instruction: Option<Instruction>,
    response: Option<ActionResult>,
}

impl SessionEntry {
    fn idle() -> Self {
        SessionEntry {
            state: SessionState::Idle,
            instruction: None,
            response: None,
        }
    }
}

/// Map-backed store hosted by the server process.
///
/// A single mutex over the whole map is what makes the multi-field
/// transitions atomic: every operation is one short critical section, and
/// the guard check plus all writes of a [`StateUpdate`] happen under the
/// same acquisition. The map stays private; callers only get the trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, terminal or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, id: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert(id.to_string(), SessionEntry::idle());
        Ok(())
    }

    async fn read_state(&self, id: &str) -> Result<Option<SessionState>, StoreError> {
        Ok(self.entries.lock().get(id).map(|e| e.state))
    }

    async fn transition(&self, id: &str, update: StateUpdate) -> Result<Transition, StoreError> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(id) else {
            return Ok(Transition::Missing);
        };
        if !update.admits(entry.state) {
            return Ok(Transition::Conflict { state: entry.state });
        }

        entry.state = update.next;
        if update.clear_instruction {
            entry.instruction = None;
        }
        if update.clear_response {
            entry.response = None;
        }
        if let Some(instruction) = update.instruction {
            entry.instruction = Some(instruction);
        }
        if let Some(response) = update.response {
            entry.response = Some(response);
        }
        Ok(Transition::Applied)
    }

    async fn take_instruction(&self, id: &str) -> Result<Option<Instruction>, StoreError> {
        Ok(self
            .entries
            .lock()
            .get_mut(id)
            .and_then(|e| e.instruction.take()))
    }

    async fn take_response(&self, id: &str) -> Result<Option<ActionResult>, StoreError> {
        Ok(self
            .entries
            .lock()
            .get_mut(id)
            .and_then(|e| e.response.take()))
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().contains_key(id))
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
