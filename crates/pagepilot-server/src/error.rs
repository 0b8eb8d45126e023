//! Server-side error types.

use thiserror::Error;

use pagepilot_store::StoreError;

/// Errors raised by the session registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Admission rejected: the active-session cap is reached.
    #[error("session limit reached ({limit} active)")]
    CapacityExceeded { limit: usize },

    /// The worker subprocess could not be started.
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(String),

    /// The registry binary path could not be resolved.
    #[error("failed to locate worker executable: {0}")]
    ExecutableNotFound(String),

    /// Store access failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Admission failures are the caller's fault, not the server's.
    pub fn is_capacity(&self) -> bool {
        matches!(self, RegistryError::CapacityExceeded { .. })
    }
}
