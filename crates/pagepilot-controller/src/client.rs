//! HTTP client for the coordination server's session surface.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use pagepilot_config::ControllerConfig;
use pagepilot_protocols::{
    ActionResult, CreateSessionRequest, CreateSessionResponse, DeleteResponse, Instruction,
    InstructionReply, ResultReply, SessionRequest, SessionState, StopResponse, SubmitRequest,
};

use crate::error::ControllerError;

/// Session-surface client with polling built in.
///
/// Result polls and instruction submissions retry while the session is merely
/// busy; everything the server reports as final (terminal state, missing
/// session) surfaces as an error immediately. Each poll loop gives up after a
/// configured total wait.
pub struct SessionClient {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl SessionClient {
    pub fn new(base_url: &str, config: &ControllerConfig) -> Self {
        Self::with_timing(
            base_url,
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_secs(config.poll_timeout_secs),
        )
    }

    pub fn with_timing(base_url: &str, poll_interval: Duration, poll_timeout: Duration) -> Self {
        SessionClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
            poll_timeout,
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ControllerError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ControllerError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))
    }

    /// Create a session for `url`, returning its id.
    pub async fn create(&self, url: &str) -> Result<String, ControllerError> {
        let reply: CreateSessionResponse = self
            .post_json(
                "/session/create",
                &CreateSessionRequest {
                    url: url.to_string(),
                },
            )
            .await?;
        debug!(session = %reply.session_id, "session created");
        Ok(reply.session_id)
    }

    /// Poll until the worker publishes a result and claim it.
    ///
    /// Idle/Running replies mean the worker is still busy and are retried on
    /// the poll interval until the timeout. A claimed result with no payload
    /// means a concurrent caller emptied the slot first, which this client
    /// treats as a protocol violation.
    pub async fn get_result(&self, session_id: &str) -> Result<ActionResult, ControllerError> {
        let deadline = Instant::now() + self.poll_timeout;
        let request = SessionRequest {
            session_id: session_id.to_string(),
        };

        loop {
            let reply: ResultReply = self.post_json("/session/result", &request).await?;
            match reply {
                ResultReply::Success {
                    result: Some(result),
                } => return Ok(result),
                ResultReply::Success { result: None } => {
                    return Err(ControllerError::Protocol(
                        "result claimed but payload was already taken".to_string(),
                    ))
                }
                ResultReply::Failed {
                    state: SessionState::Idle | SessionState::Running,
                } => {
                    if Instant::now() >= deadline {
                        return Err(ControllerError::PollTimeout {
                            waited_secs: self.poll_timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                ResultReply::Failed {
                    state: SessionState::Result,
                } => {
                    return Err(ControllerError::Protocol(
                        "result poll rejected while a result was pending".to_string(),
                    ))
                }
                ResultReply::Failed {
                    state: state @ (SessionState::Finish | SessionState::Fatal),
                } => return Err(ControllerError::Terminal { state }),
                ResultReply::NotExist => return Err(ControllerError::SessionGone),
            }
        }
    }

    /// Submit the next instruction, retrying while the worker still holds
    /// the previous one.
    pub async fn send_instruction(
        &self,
        session_id: &str,
        instruction: Instruction,
    ) -> Result<(), ControllerError> {
        let deadline = Instant::now() + self.poll_timeout;
        let request = SubmitRequest {
            session_id: session_id.to_string(),
            instruction,
        };

        loop {
            let reply: InstructionReply = self.post_json("/session/instruction", &request).await?;
            match reply {
                InstructionReply::Success => return Ok(()),
                InstructionReply::Failed { state } if !state.is_terminal() => {
                    if Instant::now() >= deadline {
                        return Err(ControllerError::PollTimeout {
                            waited_secs: self.poll_timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                InstructionReply::Failed { state } => {
                    return Err(ControllerError::Terminal { state })
                }
                InstructionReply::NotExist => return Err(ControllerError::SessionGone),
            }
        }
    }

    /// Force the session to wind down; the worker exits on its next poll.
    pub async fn stop(&self, session_id: &str) -> Result<bool, ControllerError> {
        let reply: StopResponse = self
            .post_json(
                "/session/stop",
                &SessionRequest {
                    session_id: session_id.to_string(),
                },
            )
            .await?;
        Ok(reply.stopped)
    }

    /// Stop the session and drop every trace of it server-side.
    pub async fn delete(&self, session_id: &str) -> Result<bool, ControllerError> {
        let reply: DeleteResponse = self
            .post_json(
                "/session/delete",
                &SessionRequest {
                    session_id: session_id.to_string(),
                },
            )
            .await?;
        Ok(reply.deleted)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
