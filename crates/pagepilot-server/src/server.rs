//! Coordination server bootstrap.
//!
//! The server process hosts the authoritative session store and the
//! registry. Worker subprocesses it spawns dial back into its
//! `/internal/store` surface, so the server must be reachable at the
//! configured host and port before any session is created.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use pagepilot_config::Config;
use pagepilot_store::MemoryStore;

use crate::error::RegistryError;
use crate::http::routes::create_router;
use crate::registry::{SessionRegistry, SubprocessLauncher, WorkerLauncher};
use crate::state::AppState;

/// The coordination server.
pub struct Server {
    host: String,
    port: u16,
    state: Arc<AppState>,
}

impl Server {
    /// Wire the store, registry and worker launcher from a loaded config.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let store_url = format!("http://{}:{}", config.server.host, config.server.port);
        let launcher = SubprocessLauncher::from_current_exe(store_url)?;
        Ok(Self::with_launcher(config, Box::new(launcher)))
    }

    /// Server with a custom worker launcher.
    pub fn with_launcher(config: &Config, launcher: Box<dyn WorkerLauncher>) -> Self {
        let store = MemoryStore::new();
        let registry = SessionRegistry::new(
            store.clone(),
            launcher,
            config.registry.max_sessions,
            Duration::from_millis(config.registry.kill_grace_ms),
        );
        Server {
            host: config.server.host.clone(),
            port: config.server.port,
            state: Arc::new(AppState::new(store, registry)),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Run until ctrl-c, then kill every live worker before returning.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("coordination server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.state.registry.shutdown_all().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed");
        return;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_from_default_config() {
        let config = Config::default();
        let server = Server::with_launcher(&config, Box::new(FailingLauncher));
        assert_eq!(server.addr(), "127.0.0.1:8090");
    }

    #[test]
    fn test_addr_with_custom_host_port() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 9000;
        let server = Server::with_launcher(&config, Box::new(FailingLauncher));
        assert_eq!(server.addr(), "0.0.0.0:9000");
    }

    struct FailingLauncher;

    #[async_trait::async_trait]
    impl WorkerLauncher for FailingLauncher {
        async fn launch(
            &self,
            _session_id: &str,
            _url: &str,
        ) -> Result<crate::registry::WorkerHandle, RegistryError> {
            Err(RegistryError::SpawnFailed("test launcher".into()))
        }
    }
}
