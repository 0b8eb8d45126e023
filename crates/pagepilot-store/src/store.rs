//! The session store trait.

use async_trait::async_trait;

use pagepilot_protocols::{ActionResult, Instruction, SessionState, StateUpdate, Transition};

use crate::error::StoreError;

/// The shared session store both sides of the protocol talk through.
///
/// Four logical operations carry the whole coordination protocol: read the
/// state, apply a guarded atomic transition, destructively read a field,
/// and check existence. `create`/`remove` are the registry-side entry
/// lifecycle (seed `Idle`, purge after teardown).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Seed a fresh entry in `Idle` state, replacing any previous entry
    /// under the same id.
    async fn create(&self, id: &str) -> Result<(), StoreError>;

    /// Current state, or `None` when no entry exists.
    async fn read_state(&self, id: &str) -> Result<Option<SessionState>, StoreError>;

    /// Apply `update` atomically: check the guard, advance the state and
    /// write/clear fields as one indivisible step.
    async fn transition(&self, id: &str, update: StateUpdate) -> Result<Transition, StoreError>;

    /// Destructively read the pending instruction. At most one caller ever
    /// receives a given instruction.
    async fn take_instruction(&self, id: &str) -> Result<Option<Instruction>, StoreError>;

    /// Destructively read the published response. At most one caller ever
    /// receives a given response; the state is left untouched.
    async fn take_response(&self, id: &str) -> Result<Option<ActionResult>, StoreError>;

    async fn exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Drop the entry entirely; subsequent reads report the session gone.
    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}
