//! Application state.

use std::time::Instant;

use pagepilot_store::MemoryStore;

use crate::registry::SessionRegistry;

/// State shared across HTTP handlers.
///
/// The server hosts the authoritative [`MemoryStore`]; the registry holds a
/// clone of the same map, so lifecycle writes and handler reads agree.
pub struct AppState {
    pub store: MemoryStore,
    pub registry: SessionRegistry<MemoryStore>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: MemoryStore, registry: SessionRegistry<MemoryStore>) -> Self {
        AppState {
            store,
            registry,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the server process came up.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
