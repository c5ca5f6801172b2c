// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP request and response bodies.
//!
//! All state lives server-side; these are projections. Field names are wire
//! contract: `uuid`, `api_key`, `job_plugins`, `error`.

use serde::{Deserialize, Serialize};

use crate::value::{StatusMap, Value};

/// Externally visible projection of a job record.
///
/// Never carries the auth token. `status` includes the `exception` key once
/// the supervisor has delivered a failure record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub uuid: String,
    pub name: String,
    pub config: Value,
    #[serde(default)]
    pub status: StatusMap,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub killed: bool,
    #[serde(default)]
    pub finished: bool,
}

/// `POST /jobs` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub name: String,
    #[serde(default = "Value::empty_map")]
    pub config: Value,
    /// Start the job immediately after creation.
    #[serde(default)]
    pub running: bool,
    /// Port the daemon hands to workers so their status channel targets back
    /// correctly. Defaults to the daemon's listening port.
    #[serde(default)]
    pub port: Option<u16>,
}

/// `PUT /jobs/{id}` body. Requests without `status` are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub api_key: String,
    #[serde(default)]
    pub status: Option<StatusMap>,
}

/// `PUT /jobs/{id}/start` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedResponse {
    pub uuid: String,
    pub started: bool,
}

/// `PUT /jobs/{id}/kill` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KilledResponse {
    pub uuid: String,
    pub killed: bool,
}

/// `GET /jobs` and `GET /jobs/running` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobView>,
}

/// `GET /job_plugins` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsResponse {
    pub job_plugins: Vec<String>,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod tests;
