//! Store error types.

use thiserror::Error;

/// Failures reaching or decoding the store backend.
///
/// Protocol-level rejections (wrong prior state, missing session) are not
/// errors; they come back as [`Transition`](pagepilot_protocols::Transition)
/// variants. These errors mean the store itself was unreachable or spoke
/// garbage, which callers treat as fatal for the session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached at all.
    #[error("store request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("store replied {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the body did not parse.
    #[error("malformed store reply: {0}")]
    InvalidReply(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}
