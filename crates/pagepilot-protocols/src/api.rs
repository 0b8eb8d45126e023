//! HTTP surface DTOs shared by the server and its clients.
//!
//! The session surface is what the controller talks to; the store surface is
//! what worker subprocesses use to reach the server-hosted session store.

use serde::{Deserialize, Serialize};

use crate::action::ActionResult;
use crate::instruction::Instruction;
use crate::state::SessionState;

/// `POST /session/create` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Target page URL the worker navigates to first.
    pub url: String,
}

/// `POST /session/create` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Body for the session-scoped operations (result/stop/delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// `POST /session/instruction` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub session_id: String,
    pub instruction: Instruction,
}

/// `POST /session/stop` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    pub stopped: bool,
}

/// `POST /session/delete` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// `GET /healthz` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub uptime_secs: u64,
}

/// Error body for non-2xx replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}

/// `GET /internal/store/{id}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntryResponse {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
}

/// `POST /internal/store/{id}/instruction/take` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeInstructionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Instruction>,
}

/// `POST /internal/store/{id}/response/take` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeResultResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ActionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_round_trip() {
        let req = SubmitRequest {
            session_id: "abc".into(),
            instruction: Instruction::Type {
                label: 5,
                content: "hello".into(),
            },
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""type":"Type""#));
        let back: SubmitRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.session_id, "abc");
    }

    #[test]
    fn test_store_entry_absent_state_omitted() {
        let body = StoreEntryResponse {
            exists: false,
            state: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"exists":false}"#
        );
    }
}
