//! Session and store surface handlers.
//!
//! Handlers are thin DTO mappers: protocol rejections travel as data
//! ([`ResultReply`]/[`InstructionReply`] with 200), HTTP status codes are
//! reserved for admission failures and transport-level problems.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error, info};
use url::Url;

use pagepilot_protocols::{
    CreateSessionRequest, CreateSessionResponse, DeleteResponse, ErrorResponse, HealthResponse,
    InstructionReply, ResultReply, SessionRequest, SessionState, StateUpdate, StopResponse,
    StoreEntryResponse, SubmitRequest, TakeInstructionResponse, TakeResultResponse, Transition,
};
use pagepilot_store::{SessionStore, StoreError};

use crate::error::RegistryError;
use crate::state::AppState;

fn store_failure(e: StoreError) -> Response {
    error!(error = %e, "store access failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(e.to_string())),
    )
        .into_response()
}

fn registry_failure(e: RegistryError) -> Response {
    error!(error = %e, "registry operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(e.to_string())),
    )
        .into_response()
}

fn validate_url(raw: &str) -> Result<(), String> {
    let parsed = Url::parse(raw).map_err(|e| format!("invalid url: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported url scheme: {other}")),
    }
}

/// Admit a new session and spawn its worker.
///
/// POST /session/create
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    info!(url = %req.url, "session create requested");

    if let Err(reason) = validate_url(&req.url) {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response();
    }

    match state.registry.create(&req.url).await {
        Ok(session_id) => (
            StatusCode::CREATED,
            Json(CreateSessionResponse { session_id }),
        )
            .into_response(),
        Err(e) if e.is_capacity() => {
            (StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
        Err(e) => registry_failure(e),
    }
}

/// Poll for the session's pending result.
///
/// POST /session/result
///
/// A terminal state observed here triggers the session teardown: the first
/// caller to see Finish or Fatal reaps the session, and later polls get
/// NotExist.
pub async fn session_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let current = match state.store.read_state(&req.session_id).await {
        Ok(current) => current,
        Err(e) => return store_failure(e),
    };

    let reply = match current {
        None => ResultReply::NotExist,
        Some(observed @ (SessionState::Finish | SessionState::Fatal)) => {
            state.registry.reap(&req.session_id).await;
            ResultReply::Failed { state: observed }
        }
        Some(SessionState::Result) => match state.store.take_response(&req.session_id).await {
            Ok(result) => ResultReply::Success { result },
            Err(e) => return store_failure(e),
        },
        Some(observed) => ResultReply::Failed { state: observed },
    };
    debug!(session = %req.session_id, ?reply, "result poll");
    Json(reply).into_response()
}

/// Submit the next instruction for a session.
///
/// POST /session/instruction
///
/// The guarded Result to Running transition writes the instruction and
/// advances the state in one step, so concurrent submissions against the
/// same result cannot both apply.
pub async fn submit_instruction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    let update = StateUpdate::to(SessionState::Running)
        .expecting([SessionState::Result])
        .with_instruction(req.instruction);

    let reply = match state.store.transition(&req.session_id, update).await {
        Ok(Transition::Applied) => InstructionReply::Success,
        Ok(Transition::Conflict { state: observed }) => InstructionReply::Failed { state: observed },
        Ok(Transition::Missing) => InstructionReply::NotExist,
        Err(e) => return store_failure(e),
    };
    debug!(session = %req.session_id, ?reply, "instruction submitted");
    Json(reply).into_response()
}

/// Force a session to finish.
///
/// POST /session/stop
pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    match state.registry.stop(&req.session_id).await {
        Ok(stopped) => Json(StopResponse { stopped }).into_response(),
        Err(e) => registry_failure(e),
    }
}

/// Stop a session and forget it entirely.
///
/// POST /session/delete
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    match state.registry.delete(&req.session_id).await {
        Ok(deleted) => Json(DeleteResponse { deleted }).into_response(),
        Err(e) => registry_failure(e),
    }
}

/// Liveness probe with basic counters.
///
/// GET /healthz
pub async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        active_sessions: state.registry.active_count(),
        uptime_secs: state.uptime_secs(),
    })
}

/// GET /internal/store/{id}
pub async fn store_entry(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.store.read_state(&id).await {
        Ok(current) => Json(StoreEntryResponse {
            exists: current.is_some(),
            state: current,
        })
        .into_response(),
        Err(e) => store_failure(e),
    }
}

/// PUT /internal/store/{id}
pub async fn store_create(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.store.create(&id).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => store_failure(e),
    }
}

/// DELETE /internal/store/{id}
pub async fn store_remove(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.store.remove(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_failure(e),
    }
}

/// POST /internal/store/{id}/transition
pub async fn store_transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<StateUpdate>,
) -> Response {
    match state.store.transition(&id, update).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => store_failure(e),
    }
}

/// POST /internal/store/{id}/instruction/take
pub async fn store_take_instruction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.take_instruction(&id).await {
        Ok(instruction) => Json(TakeInstructionResponse { instruction }).into_response(),
        Err(e) => store_failure(e),
    }
}

/// POST /internal/store/{id}/response/take
pub async fn store_take_response(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.take_response(&id).await {
        Ok(response) => Json(TakeResultResponse { response }).into_response(),
        Err(e) => store_failure(e),
    }
}
