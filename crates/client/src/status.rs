// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status channels: how a job body publishes progress.
//!
//! The network [`StatusUpdater`] is handed to the body when it runs inside a
//! worker process; it is the worker's only legitimate path for publishing
//! progress. [`MockStatusUpdater`] stands in while developing a body outside
//! the daemon.

use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::error::ClientError;
use crate::transport::Transport;
use errand_core::{AuthToken, JobError, JobId};
use errand_wire::{StatusMap, StatusUpdateRequest};

/// Where a job body publishes its status.
pub trait StatusChannel: Send + Sync {
    /// Publish a status mapping. The server merges it into the job's record:
    /// matching keys are overwritten, other keys are untouched.
    fn update(&self, status: StatusMap) -> Result<(), ClientError>;

    /// The last mapping published through this channel.
    fn last(&self) -> StatusMap;

    /// Merge `partial` into the last published mapping and publish the
    /// result. Convenience for bodies that accumulate progress keys.
    fn merge(&self, partial: StatusMap) -> Result<(), ClientError> {
        let mut merged = self.last();
        merged.extend(partial);
        self.update(merged)
    }
}

/// Publishes status updates to the daemon that owns the job.
pub struct StatusUpdater {
    transport: Transport,
    job_id: JobId,
    api_key: AuthToken,
    last: Mutex<StatusMap>,
}

impl StatusUpdater {
    /// `addr` is `host` or `host:port` of the owning daemon.
    pub fn new(addr: &str, job_id: JobId, api_key: AuthToken) -> Result<Self, ClientError> {
        Ok(Self {
            transport: Transport::new(addr)?,
            job_id,
            api_key,
            last: Mutex::new(StatusMap::new()),
        })
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }
}

impl StatusChannel for StatusUpdater {
    fn update(&self, status: StatusMap) -> Result<(), ClientError> {
        let body = StatusUpdateRequest {
            api_key: self.api_key.as_str().to_string(),
            status: Some(status.clone()),
        };
        let (code, _) = self.transport.put(&format!("/jobs/{}", self.job_id), &body)?;
        match code {
            StatusCode::NOT_FOUND => {
                Err(ClientError::Job(JobError::NoSuchJob(self.job_id.clone())))
            }
            StatusCode::UNAUTHORIZED => Err(ClientError::Job(JobError::NotAuthorized)),
            _ => {
                *self.last.lock() = status;
                Ok(())
            }
        }
    }

    fn last(&self) -> StatusMap {
        self.last.lock().clone()
    }
}

/// Buffers updates and logs them; for developing job bodies by hand.
#[derive(Default)]
pub struct MockStatusUpdater {
    updates: Mutex<Vec<StatusMap>>,
}

impl MockStatusUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mapping published so far, in order.
    pub fn updates(&self) -> Vec<StatusMap> {
        self.updates.lock().clone()
    }
}

impl StatusChannel for MockStatusUpdater {
    fn update(&self, status: StatusMap) -> Result<(), ClientError> {
        tracing::info!(status = ?status, "status update");
        self.updates.lock().push(status);
        Ok(())
    }

    fn last(&self) -> StatusMap {
        self.updates.lock().last().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
