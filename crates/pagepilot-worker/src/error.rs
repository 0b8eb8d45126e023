//! Worker error types.

use thiserror::Error;

use pagepilot_store::StoreError;

use crate::cdp::CdpError;
use crate::chrome::ChromeError;

/// Errors raised while driving the page.
///
/// `NotClickable` and `NotTypeable` are the per-action failures of the
/// protocol: they surface in the next published result instead of ending
/// the session. Everything else is fatal to the worker.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("element {label} is not clickable")]
    NotClickable { label: u32 },

    #[error("element {label} is not typeable")]
    NotTypeable { label: u32 },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page script failed: {0}")]
    Script(String),

    #[error(transparent)]
    Launch(#[from] ChromeError),

    #[error(transparent)]
    Cdp(#[from] CdpError),
}

impl PageError {
    /// Whether the session survives this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PageError::NotClickable { .. } | PageError::NotTypeable { .. }
        )
    }
}

/// Top-level worker failure, converted to a Fatal transition on the way out.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("session lifetime exceeded")]
    LifetimeExceeded,
}
