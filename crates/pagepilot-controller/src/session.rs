//! End-to-end task loop: session results in, LLM instructions out.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::chat::ChatMessage;
use crate::client::SessionClient;
use crate::error::ControllerError;
use crate::llm::LlmClient;
use crate::parser::parse_reply;
use crate::prompt::screenshot_turn;
use crate::recorder::RunRecorder;

/// One task to drive against a page.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Page the session opens first.
    pub url: String,
    /// Natural-language goal handed to the agent every iteration.
    pub task: String,
    /// Hard cap on agent iterations before giving up.
    pub max_iterations: u32,
    /// Directory for screenshots and the thought log.
    pub output_dir: PathBuf,
}

/// What a finished (or exhausted) run looked like.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Iterations actually executed.
    pub iterations: u32,
    /// Whether the agent declared the task done, as opposed to running out
    /// of iterations.
    pub finished: bool,
    pub last_thought: Option<String>,
}

/// Drives one session: create, iterate result/instruction, always delete.
pub struct TaskRunner {
    client: SessionClient,
    llm: LlmClient,
    config: TaskConfig,
}

impl TaskRunner {
    pub fn new(client: SessionClient, llm: LlmClient, config: TaskConfig) -> Self {
        TaskRunner {
            client,
            llm,
            config,
        }
    }

    /// Run the task to completion.
    ///
    /// The session is deleted on every exit path once it exists; a failed
    /// delete is logged but never masks the run's own outcome.
    pub async fn run(&self) -> Result<TaskReport, ControllerError> {
        let recorder = RunRecorder::create(&self.config.output_dir).await?;
        let session_id = self.client.create(&self.config.url).await?;
        info!(session = %session_id, url = %self.config.url, "task started");

        let outcome = self.drive(&session_id, &recorder).await;

        if let Err(e) = self.client.delete(&session_id).await {
            warn!(session = %session_id, error = %e, "session delete failed");
        }

        match &outcome {
            Ok(report) => {
                info!(
                    session = %session_id,
                    iterations = report.iterations,
                    finished = report.finished,
                    "task ended"
                );
            }
            Err(e) => warn!(session = %session_id, error = %e, "task failed"),
        }
        outcome
    }

    async fn drive(
        &self,
        session_id: &str,
        recorder: &RunRecorder,
    ) -> Result<TaskReport, ControllerError> {
        let mut transcript: Vec<ChatMessage> = Vec::new();
        let mut iterations = 0;
        let mut finished = false;
        let mut last_thought = None;

        for iteration in 0..self.config.max_iterations {
            let result = self.client.get_result(session_id).await?;
            recorder
                .save_screenshot(iteration, result.screenshot())
                .await?;
            transcript.push(screenshot_turn(&result, &self.config.task, iteration == 0));

            let reply = self.llm.complete(&transcript).await?;
            let (thought, instruction) = parse_reply(&reply)?;
            recorder.log_thought(iteration, &thought).await?;
            info!(iteration, thought = %thought, action = %instruction, "agent step");
            if !thought.is_empty() {
                last_thought = Some(thought);
            }
            iterations = iteration + 1;

            if instruction.is_finish() {
                finished = true;
                break;
            }

            // The agent's reply joins the transcript only when the session
            // continues; a Finish reply would add nothing to react to.
            transcript.push(ChatMessage::assistant(reply));
            self.client.send_instruction(session_id, instruction).await?;
        }

        Ok(TaskReport {
            iterations,
            finished,
            last_thought,
        })
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
