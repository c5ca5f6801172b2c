// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: a thin router over the manager.
//!
//! Each route parses the request payload, calls the manager, serializes the
//! result, and maps lifecycle errors to status codes. Routes are stateless;
//! all state lives in the manager. No raw error ever leaks: anything
//! unmapped becomes a 500 with an `{"error": ...}` body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::manager::{JobManager, ManagerError};
use crate::registry::PluginRegistry;
use errand_core::JobError;
use errand_wire::{
    CodecError, CreateJobRequest, ErrorBody, JobsResponse, KilledResponse, PluginsResponse,
    StartedResponse, StatusUpdateRequest,
};

/// Explicit dependencies for every handler; constructed in `main`.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<JobManager>,
    pub registry: Arc<PluginRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/running", get(running_jobs))
        .route("/jobs/:id", get(get_job).put(update_status))
        .route("/jobs/:id/start", put(start_job))
        .route("/jobs/:id/kill", put(kill_job))
        .route("/job_plugins", get(list_plugins))
        .route("/reload", put(reload_plugins))
        .with_state(state)
}

/// Handler-level error with its HTTP projection.
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Malformed(#[from] CodecError),

    #[error("Something went wrong on the server")]
    Internal(String),
}

impl From<ManagerError> for ApiError {
    fn from(error: ManagerError) -> Self {
        match error {
            ManagerError::Job(job) => ApiError::Job(job),
            ManagerError::Spawn(spawn) => ApiError::Internal(spawn.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::Job(JobError::NoSuchPlugin(_)) => StatusCode::BAD_REQUEST,
            ApiError::Job(JobError::NoSuchJob(_)) => StatusCode::NOT_FOUND,
            ApiError::Job(JobError::AlreadyStarted(_)) => StatusCode::FORBIDDEN,
            ApiError::Job(JobError::NotStarted(_)) => StatusCode::FORBIDDEN,
            ApiError::Job(JobError::NotAuthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody { error: self.to_string() };
        json_response(code, &body)
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Malformed(CodecError::MalformedPayload(e.to_string())))
}

fn json_response<T: Serialize>(code: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            (code, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            let fallback = serde_json::to_vec(&ErrorBody {
                error: "Something went wrong on the server".to_string(),
            })
            .unwrap_or_default();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                fallback,
            )
                .into_response()
        }
    }
}

fn ok<T: Serialize>(value: &T) -> Response {
    json_response(StatusCode::OK, value)
}

async fn list_jobs(State(state): State<AppState>) -> Response {
    let jobs = state.manager.list().iter().map(|job| job.to_view()).collect();
    ok(&JobsResponse { jobs })
}

async fn create_job(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: CreateJobRequest = parse_body(&body)?;
    tracing::debug!(plugin = %request.name, start = request.running, "create job requested");
    let job =
        state.manager.create(&request.name, request.config, request.running, request.port)?;
    Ok(ok(&job.to_view()))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(ok(&state.manager.get(&id)?.to_view()))
}

/// Status update from the job's worker. A request without `status` is
/// accepted and ignored; a wrong `api_key` leaves the record unchanged.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: StatusUpdateRequest = parse_body(&body)?;
    let job = state.manager.get(&id)?;
    if let Some(status) = request.status {
        job.update_status(&request.api_key, status)?;
    }
    Ok(ok(&job.to_view()))
}

async fn start_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state.manager.get(&id)?;
    state.manager.start(&job)?;
    Ok(ok(&StartedResponse { uuid: job.id().as_str().to_string(), started: true }))
}

async fn kill_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state.manager.get(&id)?;
    job.kill()?;
    Ok(ok(&KilledResponse { uuid: job.id().as_str().to_string(), killed: true }))
}

async fn running_jobs(State(state): State<AppState>) -> Response {
    let jobs = state.manager.list_running().iter().map(|job| job.to_view()).collect();
    ok(&JobsResponse { jobs })
}

async fn list_plugins(State(state): State<AppState>) -> Response {
    ok(&PluginsResponse { job_plugins: state.registry.list() })
}

async fn reload_plugins(State(state): State<AppState>) -> Response {
    state.registry.refresh();
    ok(&serde_json::json!({}))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
