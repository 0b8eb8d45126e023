//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::handlers::{
    create_session, delete_session, healthz, session_result, stop_session, store_create,
    store_entry, store_remove, store_take_instruction, store_take_response, store_transition,
    submit_instruction,
};
use crate::state::AppState;

/// Create the server router.
///
/// ## Route Structure
///
/// ```text
/// /session
///   POST   /session/create      - Admit a session, spawn its worker
///   POST   /session/result      - Poll for the pending result
///   POST   /session/instruction - Submit the next instruction
///   POST   /session/stop        - Force a session to finish
///   POST   /session/delete      - Stop and forget a session
///
/// /internal/store (worker subprocesses only)
///   GET    /internal/store/{id}                  - Entry existence and state
///   PUT    /internal/store/{id}                  - Seed an entry at Idle
///   DELETE /internal/store/{id}                  - Drop an entry
///   POST   /internal/store/{id}/transition       - Guarded atomic update
///   POST   /internal/store/{id}/instruction/take - Destructive instruction read
///   POST   /internal/store/{id}/response/take    - Destructive response read
///
/// /healthz - Liveness probe
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    // Controller-facing session lifecycle
    let session_routes = Router::new()
        .route("/create", post(create_session))
        .route("/result", post(session_result))
        .route("/instruction", post(submit_instruction))
        .route("/stop", post(stop_session))
        .route("/delete", post(delete_session))
        .with_state(state.clone());

    // Store surface consumed by worker subprocesses
    let store_routes = Router::new()
        .route(
            "/{id}",
            get(store_entry).put(store_create).delete(store_remove),
        )
        .route("/{id}/transition", post(store_transition))
        .route("/{id}/instruction/take", post(store_take_instruction))
        .route("/{id}/response/take", post(store_take_response))
        .with_state(state.clone());

    let health_route = Router::new()
        .route("/healthz", get(healthz))
        .with_state(state);

    Router::new()
        .nest("/session", session_routes)
        .nest("/internal/store", store_routes)
        .merge(health_route)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
