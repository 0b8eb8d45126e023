//! # PagePilot Config
//!
//! TOML configuration with `${VAR}` environment expansion. Every field has a
//! default, so a missing file yields a working local setup; the loader only
//! fails on unreadable files, bad TOML, or unexpandable variables.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    Config, ControllerConfig, LlmConfig, RegistryConfig, ServerConfig, WorkerConfig,
};
