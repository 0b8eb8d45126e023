//! Session lifecycle registry.
//!
//! The registry is the only component that creates and destroys sessions.
//! Each live session is one store entry plus one worker subprocess; the
//! registry keeps them in lockstep: admission seeds the entry before the
//! worker spawns, teardown kills the worker and purges the entry. The
//! record map itself stays private behind the lifecycle operations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pagepilot_protocols::{Instruction, SessionState, StateUpdate};
use pagepilot_store::SessionStore;

use crate::error::RegistryError;

/// Handle to a running worker subprocess.
///
/// A detached handle (no child) tracks a session whose worker runs outside
/// the registry's control, e.g. in tests.
pub struct WorkerHandle {
    child: Option<Child>,
}

impl WorkerHandle {
    pub fn from_child(child: Child) -> Self {
        WorkerHandle { child: Some(child) }
    }

    /// Handle with no process to manage.
    pub fn detached() -> Self {
        WorkerHandle { child: None }
    }

    /// Force-kill the worker process. No-op for detached handles or
    /// already-dead children.
    pub async fn kill(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.kill().await {
                debug!(error = %e, "worker kill failed");
            }
        }
    }
}

/// Spawns the worker side of a session.
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    async fn launch(&self, session_id: &str, url: &str) -> Result<WorkerHandle, RegistryError>;
}

/// Production launcher: re-executes this binary with the hidden `worker`
/// subcommand, pointed back at this server's store surface.
pub struct SubprocessLauncher {
    program: PathBuf,
    store_url: String,
}

impl SubprocessLauncher {
    pub fn new(program: PathBuf, store_url: impl Into<String>) -> Self {
        SubprocessLauncher {
            program,
            store_url: store_url.into(),
        }
    }

    /// Launcher for the current executable.
    pub fn from_current_exe(store_url: impl Into<String>) -> Result<Self, RegistryError> {
        let program = std::env::current_exe()
            .map_err(|e| RegistryError::ExecutableNotFound(e.to_string()))?;
        Ok(Self::new(program, store_url))
    }
}

#[async_trait]
impl WorkerLauncher for SubprocessLauncher {
    async fn launch(&self, session_id: &str, url: &str) -> Result<WorkerHandle, RegistryError> {
        let child = Command::new(&self.program)
            .arg("worker")
            .arg("--session")
            .arg(session_id)
            .arg("--url")
            .arg(url)
            .arg("--store")
            .arg(&self.store_url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RegistryError::SpawnFailed(e.to_string()))?;

        info!(session = session_id, pid = child.id(), "worker spawned");
        Ok(WorkerHandle::from_child(child))
    }
}

struct SessionRecord {
    worker: Option<WorkerHandle>,
    aborted: bool,
}

/// Registry of live sessions with a concurrency cap.
pub struct SessionRegistry<S> {
    store: S,
    launcher: Box<dyn WorkerLauncher>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    max_sessions: usize,
    kill_grace: Duration,
}

impl<S: SessionStore> SessionRegistry<S> {
    pub fn new(
        store: S,
        launcher: Box<dyn WorkerLauncher>,
        max_sessions: usize,
        kill_grace: Duration,
    ) -> Self {
        SessionRegistry {
            store,
            launcher,
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
            kill_grace,
        }
    }

    /// Number of recorded sessions, stopped-but-not-deleted included.
    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Admit a new session: seed the store entry at `Idle` and spawn its
    /// worker. Fails without side effects when the cap is reached.
    pub async fn create(&self, url: &str) -> Result<String, RegistryError> {
        let session_id = Uuid::new_v4().to_string();

        // Reserve the slot under the lock so concurrent creates cannot
        // overshoot the cap while this one is still spawning.
        {
            let mut sessions = self.sessions.lock();
            if sessions.len() >= self.max_sessions {
                return Err(RegistryError::CapacityExceeded {
                    limit: self.max_sessions,
                });
            }
            sessions.insert(
                session_id.clone(),
                SessionRecord {
                    worker: None,
                    aborted: false,
                },
            );
        }

        if let Err(e) = self.store.create(&session_id).await {
            self.sessions.lock().remove(&session_id);
            return Err(e.into());
        }

        let handle = match self.launcher.launch(&session_id, url).await {
            Ok(handle) => handle,
            Err(e) => {
                self.sessions.lock().remove(&session_id);
                let _ = self.store.remove(&session_id).await;
                return Err(e);
            }
        };

        let orphan = {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(&session_id) {
                Some(record) => {
                    record.worker = Some(handle);
                    None
                }
                // Deleted while the spawn was in flight.
                None => Some(handle),
            }
        };
        if let Some(mut handle) = orphan {
            warn!(session = %session_id, "session deleted during spawn, stopping worker");
            handle.kill().await;
        }

        info!(session = %session_id, url, "session created");
        Ok(session_id)
    }

    /// Force a session to finish out of band.
    ///
    /// Writes the synthetic Finish (state and instruction together, response
    /// cleared) so a worker blocked on instruction polling observes it on its
    /// next poll, then schedules a worker kill after the grace delay without
    /// blocking the caller. The record stays until delete or reap.
    pub async fn stop(&self, session_id: &str) -> Result<bool, RegistryError> {
        {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(session_id) {
                None => return Ok(false),
                // A second stop has nothing left to do.
                Some(record) if record.aborted => return Ok(true),
                Some(record) => record.aborted = true,
            }
        }

        let update = StateUpdate::to(SessionState::Finish)
            .with_instruction(Instruction::Finish)
            .clearing_response();
        let outcome = self.store.transition(session_id, update).await?;
        if !outcome.applied() {
            debug!(session = session_id, ?outcome, "stop found no store entry");
        }

        let handle = {
            let mut sessions = self.sessions.lock();
            sessions
                .get_mut(session_id)
                .and_then(|record| record.worker.take())
        };

        if let Some(mut handle) = handle {
            let grace = self.kill_grace;
            let id = session_id.to_string();
            info!(session = session_id, grace_ms = grace.as_millis() as u64, "session stopped");
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                handle.kill().await;
                debug!(session = %id, "worker killed after grace period");
            });
        }
        Ok(true)
    }

    /// Stop the session, drop its record, and purge its store entry, making
    /// later lookups report the session as gone.
    pub async fn delete(&self, session_id: &str) -> Result<bool, RegistryError> {
        if !self.stop(session_id).await? {
            return Ok(false);
        }
        self.sessions.lock().remove(session_id);
        self.store.remove(session_id).await?;
        info!(session = session_id, "session deleted");
        Ok(true)
    }

    /// Tear down a session observed in a terminal state: kill the worker
    /// now, drop the record, purge the store entry.
    ///
    /// Concurrent calls race on the record removal, so exactly one caller
    /// performs the kill; the rest are no-ops.
    pub async fn reap(&self, session_id: &str) {
        let record = self.sessions.lock().remove(session_id);
        let Some(mut record) = record else {
            return;
        };
        if let Some(handle) = record.worker.as_mut() {
            handle.kill().await;
        }
        if let Err(e) = self.store.remove(session_id).await {
            warn!(session = session_id, error = %e, "store purge failed during reap");
        }
        info!(session = session_id, "terminal session reaped");
    }

    /// Kill every recorded worker. Used on server shutdown.
    pub async fn shutdown_all(&self) {
        let records: Vec<(String, SessionRecord)> = self.sessions.lock().drain().collect();
        if records.is_empty() {
            return;
        }
        info!(count = records.len(), "shutting down all workers");
        for (_, mut record) in records {
            if let Some(handle) = record.worker.as_mut() {
                handle.kill().await;
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
