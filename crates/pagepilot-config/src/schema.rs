//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration (`pagepilot.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Coordination server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory for the rolling log file written by `serve`.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Session registry limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Admission cap: creations beyond this many live sessions are rejected.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Delay between a forced Finish and the worker kill, giving the worker
    /// a chance to observe the Finish instruction on its own.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            kill_grace_ms: default_kill_grace_ms(),
        }
    }
}

fn default_max_sessions() -> usize {
    3
}

fn default_kill_grace_ms() -> u64 {
    2000
}

/// Worker-side loop timings and browser setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Instruction poll interval.
    #[serde(default = "default_worker_poll_ms")]
    pub poll_interval_ms: u64,

    /// Render settle delay after an applied action, before the next shot.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Sleep duration for a Wait instruction.
    #[serde(default = "default_wait_duration_ms")]
    pub wait_duration_ms: u64,

    /// Hard cap on one session's total lifetime; expiry goes Fatal.
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome binary; well-known locations are probed otherwise.
    #[serde(default)]
    pub chrome_binary: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_worker_poll_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            wait_duration_ms: default_wait_duration_ms(),
            session_timeout_secs: default_session_timeout_secs(),
            headless: default_headless(),
            chrome_binary: None,
        }
    }
}

fn default_worker_poll_ms() -> u64 {
    500
}

fn default_settle_delay_ms() -> u64 {
    3000
}

fn default_wait_duration_ms() -> u64 {
    10_000
}

fn default_session_timeout_secs() -> u64 {
    300
}

fn default_headless() -> bool {
    true
}

/// Controller-side polling and iteration budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Backoff between result/submission polls.
    #[serde(default = "default_controller_poll_ms")]
    pub poll_interval_ms: u64,

    /// Total wait cap for one poll loop before giving up.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_controller_poll_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_controller_poll_ms() -> u64 {
    800
}

fn default_poll_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> u32 {
    10
}

/// Reasoning model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API root, without the `/chat/completions` suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Usually set as `api_key = "${OPENAI_API_KEY}"` in the file.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.registry.max_sessions, 3);
        assert_eq!(config.worker.poll_interval_ms, 500);
        assert_eq!(config.worker.session_timeout_secs, 300);
        assert!(config.worker.headless);
        assert_eq!(config.controller.poll_interval_ms, 800);
        assert_eq!(config.controller.max_iterations, 10);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }
}
