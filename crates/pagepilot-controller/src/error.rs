//! Controller-side error types.

use thiserror::Error;

use pagepilot_protocols::SessionState;

/// Errors raised while driving a task against the coordination server.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Transport failure talking to the server or the LLM endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("server replied {status}: {body}")]
    Status { status: u16, body: String },

    /// The session no longer exists on the server.
    #[error("session no longer exists")]
    SessionGone,

    /// The session reached a terminal state; no further results will come.
    #[error("session ended in state {state}")]
    Terminal { state: SessionState },

    /// The server reply violated the coordination protocol, e.g. a Success
    /// whose payload another caller already claimed.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The poll loop exhausted its total wait budget.
    #[error("no result within {waited_secs}s")]
    PollTimeout { waited_secs: u64 },

    /// The LLM endpoint answered with a non-success HTTP status.
    #[error("llm request failed with {status}: {message}")]
    LlmApi { status: u16, message: String },

    /// The assistant reply did not contain a usable instruction.
    #[error("unusable llm reply: {0}")]
    UnparseableReply(String),

    /// A screenshot payload was not valid base64.
    #[error("screenshot decode failed: {0}")]
    Decode(String),

    /// Run directory or transcript write failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_display_names_state() {
        let e = ControllerError::Terminal {
            state: SessionState::Fatal,
        };
        assert_eq!(e.to_string(), "session ended in state Fatal");
    }

    #[test]
    fn test_status_display() {
        let e = ControllerError::Status {
            status: 409,
            body: "{\"error\":\"session limit reached\"}".into(),
        };
        assert!(e.to_string().contains("409"));
    }
}
