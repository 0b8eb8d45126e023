//! # PagePilot Protocols
//!
//! Shared wire types for the session coordination protocol.
//! Contains only data definitions - no transport or store logic.
//!
//! The controller and the worker never talk to each other directly; they
//! agree on these types and exchange them through the session store:
//!
//! - [`SessionState`] - the per-session state machine
//! - [`Instruction`] - one agent-chosen page action
//! - [`ActionResult`] - the outcome of the previous action, with screenshot
//! - [`StateUpdate`] / [`Transition`] - guarded atomic store transitions
//! - [`ResultReply`] / [`InstructionReply`] - controller-facing reply taxonomy

pub mod action;
pub mod api;
pub mod instruction;
pub mod reply;
pub mod state;
pub mod update;

pub use action::ActionResult;
pub use api::{
    CreateSessionRequest, CreateSessionResponse, DeleteResponse, ErrorResponse, HealthResponse,
    SessionRequest, StopResponse, StoreEntryResponse, SubmitRequest, TakeInstructionResponse,
    TakeResultResponse,
};
pub use instruction::Instruction;
pub use reply::{InstructionReply, ResultReply};
pub use state::SessionState;
pub use update::{StateUpdate, Transition};
