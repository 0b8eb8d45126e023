//! # PagePilot Server
//!
//! Coordination server: hosts the authoritative session store, admits and
//! tears down sessions, and spawns one worker subprocess per session.
//!
//! ```text
//! controller ──HTTP /session──▶ ┌──────────────────────────────┐
//!                               │  server                      │
//!                               │  registry ──spawn──▶ worker  │
//!                               │  MemoryStore ◀─────────┐     │
//!                               └────────────────────────│─────┘
//!                                     ▲                  │
//!                                     └──HTTP /internal/store (worker)
//! ```
//!
//! The controller and the worker never talk to each other; every byte they
//! exchange goes through the store hosted here.

pub mod error;
pub mod http;
pub mod registry;
pub mod server;
pub mod state;

pub use error::RegistryError;
pub use http::routes::create_router;
pub use registry::{SessionRegistry, SubprocessLauncher, WorkerHandle, WorkerLauncher};
pub use server::Server;
pub use state::AppState;
