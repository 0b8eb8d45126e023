//! The worker's session run loop.
//!
//! One iteration of the protocol, worker side: mark the page, publish a
//! screenshot as the session result, spin on the store until the
//! controller submits an instruction, apply it, settle, repeat. A Finish
//! instruction ends the loop cleanly; any escaping error is converted to
//! a Fatal transition on the way out.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use pagepilot_protocols::{ActionResult, Instruction, SessionState, StateUpdate, Transition};
use pagepilot_store::SessionStore;

use crate::driver::PageDriver;
use crate::error::WorkerError;

/// Timings and identity for one worker run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub session_id: String,
    pub url: String,
    /// Interval between instruction polls.
    pub poll_interval: Duration,
    /// Render settle delay after an applied instruction.
    pub settle_delay: Duration,
    /// Sleep performed for a Wait instruction.
    pub wait_duration: Duration,
    /// Hard cap on the whole session; expiry goes Fatal.
    pub max_lifetime: Duration,
}

impl RunConfig {
    /// Protocol-default timings for a session.
    pub fn new(session_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            url: url.into(),
            poll_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(3000),
            wait_duration: Duration::from_millis(10_000),
            max_lifetime: Duration::from_secs(300),
        }
    }
}

/// Owns one session end to end: the store entry it claimed and the live
/// page it drives.
pub struct SessionRunner<S, D> {
    store: S,
    driver: D,
    config: RunConfig,
}

impl<S, D> SessionRunner<S, D>
where
    S: SessionStore,
    D: PageDriver,
{
    pub fn new(store: S, driver: D, config: RunConfig) -> Self {
        Self {
            store,
            driver,
            config,
        }
    }

    /// Run the session to completion.
    ///
    /// Clean protocol endings (Finish consumed, entry deleted, forced
    /// terminal) return `Ok`; an `Err` means the session went Fatal.
    pub async fn run(mut self) -> Result<(), WorkerError> {
        if !self.claim().await? {
            self.driver.close().await;
            return Ok(());
        }

        let outcome = match tokio::time::timeout(self.config.max_lifetime, self.drive()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(WorkerError::LifetimeExceeded),
        };

        if let Err(err) = &outcome {
            self.mark_fatal(err).await;
        }
        self.driver.close().await;
        outcome
    }

    /// Take ownership of a freshly created entry. False means someone else
    /// got there first (or the session is already stopped or deleted).
    async fn claim(&self) -> Result<bool, WorkerError> {
        let update = StateUpdate::to(SessionState::Running).expecting([SessionState::Idle]);
        match self.store.transition(&self.config.session_id, update).await? {
            Transition::Applied => {
                info!("claimed session {}", self.config.session_id);
                Ok(true)
            }
            Transition::Conflict { state } => {
                warn!(
                    "session {} is {} instead of Idle, not starting",
                    self.config.session_id, state
                );
                Ok(false)
            }
            Transition::Missing => {
                warn!("session {} has no entry, not starting", self.config.session_id);
                Ok(false)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), WorkerError> {
        self.driver.navigate(&self.config.url).await?;

        let mut pending_error: Option<String> = None;
        loop {
            let marker_count = self.driver.mark_page().await?;
            let screenshot = self.driver.screenshot().await?;

            let result = match pending_error.take() {
                Some(message) => ActionResult::error(message, screenshot),
                None => ActionResult::success(screenshot),
            };
            if !self.publish(result).await? {
                return Ok(());
            }

            let Some(instruction) = self.await_instruction().await? else {
                info!(
                    "session {} gone while awaiting instruction",
                    self.config.session_id
                );
                return Ok(());
            };
            debug!("session {} applying {}", self.config.session_id, instruction);

            self.driver.clear_markers(marker_count).await?;

            match instruction {
                Instruction::Finish => {
                    self.finish().await?;
                    return Ok(());
                }
                Instruction::Wait => {
                    tokio::time::sleep(self.config.wait_duration).await;
                }
                Instruction::Click { label } => {
                    if let Err(err) = self.driver.click(label).await {
                        if !err.is_recoverable() {
                            return Err(err.into());
                        }
                        info!("click on {} failed: {}", label, err);
                        pending_error = Some(err.to_string());
                    }
                }
                Instruction::Type { label, content } => {
                    if let Err(err) = self.driver.fill(label, &content).await {
                        if !err.is_recoverable() {
                            return Err(err.into());
                        }
                        info!("type into {} failed: {}", label, err);
                        pending_error = Some(err.to_string());
                    }
                }
            }

            tokio::time::sleep(self.config.settle_delay).await;
        }
    }

    /// Publish the iteration's result. False means the entry is gone or was
    /// forced terminal out from under us; the loop ends quietly.
    async fn publish(&self, result: ActionResult) -> Result<bool, WorkerError> {
        let update = StateUpdate::to(SessionState::Result)
            .expecting([SessionState::Running])
            .with_response(result);
        match self.store.transition(&self.config.session_id, update).await? {
            Transition::Applied => Ok(true),
            Transition::Conflict { state } if state.is_terminal() => {
                info!(
                    "session {} already {}, stopping",
                    self.config.session_id, state
                );
                Ok(false)
            }
            Transition::Conflict { state } => {
                warn!(
                    "publish for session {} conflicted with {}, stopping",
                    self.config.session_id, state
                );
                Ok(false)
            }
            Transition::Missing => {
                info!("session {} deleted, stopping", self.config.session_id);
                Ok(false)
            }
        }
    }

    /// Spin-poll for the next instruction. `None` means the entry vanished
    /// or went terminal without one.
    async fn await_instruction(&self) -> Result<Option<Instruction>, WorkerError> {
        loop {
            if let Some(instruction) =
                self.store.take_instruction(&self.config.session_id).await?
            {
                return Ok(Some(instruction));
            }
            match self.store.read_state(&self.config.session_id).await? {
                None => return Ok(None),
                Some(state) if state.is_terminal() => return Ok(None),
                Some(_) => {}
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Terminal Finish write. Unguarded: the registry may already have
    /// forced the entry to Finish, and the write must land either way.
    async fn finish(&self) -> Result<(), WorkerError> {
        let update = StateUpdate::to(SessionState::Finish).clearing_response();
        self.store.transition(&self.config.session_id, update).await?;
        info!("session {} finished", self.config.session_id);
        Ok(())
    }

    /// Best-effort Fatal write; the pending response is discarded with it.
    async fn mark_fatal(&self, err: &WorkerError) {
        error!("session {} failed: {}", self.config.session_id, err);
        let update = StateUpdate::to(SessionState::Fatal).clearing_response();
        if let Err(store_err) = self.store.transition(&self.config.session_id, update).await {
            error!("could not record fatal state: {}", store_err);
        }
    }
}

#[cfg(test)]
#[path = "runloop_tests.rs"]
mod tests;
