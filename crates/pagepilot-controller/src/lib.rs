//! # PagePilot Controller
//!
//! The asking side of a session. A [`TaskRunner`] creates a session on the
//! coordination server, then loops: claim the worker's latest result, show
//! the screenshot to the LLM, parse the reply into an [`Instruction`], and
//! submit it, until the agent declares the task finished or the iteration
//! budget runs out. The session is deleted on every exit path.
//!
//! The controller never touches the browser or the session store directly;
//! [`SessionClient`] speaks only the server's session surface.
//!
//! [`Instruction`]: pagepilot_protocols::Instruction

pub mod chat;
pub mod client;
pub mod error;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod recorder;
pub mod session;

pub use chat::{ChatMessage, ContentPart, ImageUrl, MessageContent};
pub use client::SessionClient;
pub use error::ControllerError;
pub use llm::LlmClient;
pub use parser::parse_reply;
pub use prompt::{screenshot_turn, SYSTEM_PROMPT};
pub use recorder::RunRecorder;
pub use session::{TaskConfig, TaskReport, TaskRunner};
