//! HTTP surface.
//!
//! Two route groups live here: the controller-facing session lifecycle
//! under `/session`, and the store surface under `/internal/store` that
//! worker subprocesses use to reach the server-hosted session store.

pub mod handlers;
pub mod routes;
