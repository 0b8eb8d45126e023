//! # PagePilot Store
//!
//! The shared session store: the only communication channel between the
//! controller side and the worker side. One trait, two backends:
//!
//! - [`MemoryStore`] - a single-mutex map, hosted inside the server process
//! - [`HttpStore`] - a thin client a worker subprocess uses to reach the
//!   server-hosted store over the `/internal/store` surface
//!
//! Both give the same guarantee: a [`StateUpdate`](pagepilot_protocols::StateUpdate)
//! applies atomically or not at all, so neither process can observe a torn
//! state/field combination.

pub mod error;
pub mod http;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use store::SessionStore;
