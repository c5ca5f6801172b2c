// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side handle to a job on a remote daemon.
//!
//! The handle caches the job's last fetched view and refreshes it over HTTP
//! with a small rate limit (one GET per [`REFRESH_INTERVAL`] unless forced).
//! `join` blocks by polling `finished` every [`POLL_INTERVAL`].

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{ClientError, RemoteFailure};
use crate::poll::{PollClock, RefreshGate, WallClock};
use crate::transport::{error_message, Transport};
use errand_core::{FailureRecord, JobError, JobId};
use errand_wire::{
    CreateJobRequest, JobView, KilledResponse, StartedResponse, StatusMap, Value,
};

/// How often `join` re-checks `finished`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum interval between view refreshes unless `force` is passed.
///
/// A sanity brake on pathological polling, not a correctness mechanism.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(200);

/// The representation of a job on a remote errand daemon.
#[derive(Debug)]
pub struct RemoteJob<C: PollClock = WallClock> {
    transport: Transport,
    name: String,
    id: JobId,
    config: Value,
    status: StatusMap,
    running: bool,
    finished: bool,
    gate: RefreshGate<C>,
}

impl RemoteJob<WallClock> {
    /// Create a job named `name` on the daemon at `address` (`host` or
    /// `host:port`) and adopt its id.
    ///
    /// Fails with [`JobError::NoSuchPlugin`] when the daemon rejects the
    /// name and with [`ClientError::Unreachable`] on transport failure.
    pub fn create(address: &str, name: impl Into<String>, config: Value) -> Result<Self, ClientError> {
        Self::create_with_clock(address, name, config, WallClock)
    }

    /// Attach to an existing job by id.
    pub fn attach(address: &str, id: JobId) -> Result<Self, ClientError> {
        Self::attach_with_clock(address, id, WallClock)
    }
}

impl<C: PollClock> RemoteJob<C> {
    pub fn create_with_clock(
        address: &str,
        name: impl Into<String>,
        config: Value,
        clock: C,
    ) -> Result<Self, ClientError> {
        let mut job = Self {
            transport: Transport::new(address)?,
            name: name.into(),
            id: JobId::from_string(""),
            config,
            status: StatusMap::new(),
            running: false,
            finished: false,
            gate: RefreshGate::new(clock, REFRESH_INTERVAL),
        };
        job.create_remote()?;
        job.refresh(true)?;
        Ok(job)
    }

    pub fn attach_with_clock(address: &str, id: JobId, clock: C) -> Result<Self, ClientError> {
        let mut job = Self {
            transport: Transport::new(address)?,
            name: String::new(),
            id,
            config: Value::empty_map(),
            status: StatusMap::new(),
            running: false,
            finished: false,
            gate: RefreshGate::new(clock, REFRESH_INTERVAL),
        };
        job.refresh(true)?;
        Ok(job)
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `host:port` of the owning daemon.
    pub fn addr(&self) -> String {
        self.transport.addr()
    }

    /// The configuration the job was created with.
    pub fn config(&mut self, force: bool) -> Result<Value, ClientError> {
        self.refresh(force)?;
        Ok(self.config.clone())
    }

    /// The job's merged status map.
    ///
    /// Raises [`ClientError::Remote`] when the view carries an `exception`,
    /// preserving the full chain so callers of callers stay debuggable.
    pub fn status(&mut self, force: bool) -> Result<StatusMap, ClientError> {
        self.refresh(force)?;
        if let Some(exception) = self.status.get("exception") {
            let json = exception.to_json()?;
            let record: FailureRecord = serde_json::from_value(json)
                .map_err(|e| ClientError::UnexpectedResponse(format!("bad failure record: {e}")))?;
            return Err(ClientError::Remote(RemoteFailure::new(
                self.transport.addr(),
                self.id.clone(),
                record,
            )));
        }
        Ok(self.status.clone())
    }

    /// True while the job's worker process is alive.
    pub fn running(&mut self, force: bool) -> Result<bool, ClientError> {
        self.refresh(force)?;
        Ok(self.running)
    }

    /// True once the job has run and is no longer running.
    ///
    /// Consults `status`, so this raises [`ClientError::Remote`] if the job
    /// failed.
    pub fn finished(&mut self, force: bool) -> Result<bool, ClientError> {
        self.status(force)?;
        Ok(self.finished)
    }

    /// Start the job. Returns the server's `started` flag.
    pub fn start(&mut self) -> Result<bool, ClientError> {
        self.refresh(false)?;
        let (code, body) = self.transport.put_empty(&format!("/jobs/{}/start", self.id))?;
        match code {
            StatusCode::NOT_FOUND => Err(ClientError::Job(JobError::NoSuchJob(self.id.clone()))),
            StatusCode::FORBIDDEN => {
                Err(ClientError::Job(JobError::AlreadyStarted(self.id.clone())))
            }
            _ => {
                let started: StartedResponse = serde_json::from_slice(&body)
                    .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
                Ok(started.started)
            }
        }
    }

    /// Send a kill signal. Success means the signal was sent, not that the
    /// worker has stopped; poll `running`/`finished` to observe termination.
    pub fn kill(&mut self, force: bool) -> Result<bool, ClientError> {
        self.refresh(force)?;
        let (code, body) = self.transport.put_empty(&format!("/jobs/{}/kill", self.id))?;
        match code {
            StatusCode::NOT_FOUND => Err(ClientError::Job(JobError::NoSuchJob(self.id.clone()))),
            StatusCode::FORBIDDEN => Err(ClientError::Job(JobError::NotStarted(self.id.clone()))),
            _ => {
                let killed: KilledResponse = serde_json::from_slice(&body)
                    .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
                Ok(killed.killed)
            }
        }
    }

    /// Block until the job finishes, polling every [`POLL_INTERVAL`].
    ///
    /// `None` disables the deadline. Raises [`ClientError::Timeout`] with
    /// the job id when the deadline fires; may raise [`ClientError::Remote`]
    /// because `finished` consults `status`.
    pub fn join(&mut self, timeout: Option<Duration>) -> Result<bool, ClientError> {
        let started = self.gate.now();
        loop {
            if self.finished(false)? {
                return Ok(true);
            }
            if let Some(limit) = timeout {
                if self.gate.now().duration_since(started) >= limit {
                    return Err(ClientError::Timeout(self.id.clone()));
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn create_remote(&mut self) -> Result<(), ClientError> {
        let request = CreateJobRequest {
            name: self.name.clone(),
            config: self.config.clone(),
            running: false,
            port: Some(self.transport.port()),
        };
        let (code, body) = self.transport.post("/jobs", &request)?;
        if code == StatusCode::BAD_REQUEST {
            tracing::debug!(error = %error_message(&body), "job creation rejected");
            return Err(ClientError::Job(JobError::NoSuchPlugin(self.name.clone())));
        }
        let view: JobView = serde_json::from_slice(&body)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        self.adopt(view);
        Ok(())
    }

    /// Fetch the job view unless the last refresh was under
    /// [`REFRESH_INTERVAL`] ago and `force` is false.
    fn refresh(&mut self, force: bool) -> Result<(), ClientError> {
        if !self.gate.open(force) {
            return Ok(());
        }
        let (code, body) = self.transport.get(&format!("/jobs/{}", self.id))?;
        if code == StatusCode::NOT_FOUND {
            return Err(ClientError::Job(JobError::NoSuchJob(self.id.clone())));
        }
        let view: JobView = serde_json::from_slice(&body)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        self.adopt(view);
        self.gate.passed();
        Ok(())
    }

    fn adopt(&mut self, view: JobView) {
        self.id = JobId::from_string(view.uuid);
        self.name = view.name;
        self.config = view.config;
        self.status = view.status;
        self.running = view.running;
        self.finished = view.finished;
    }
}

#[cfg(test)]
#[path = "remote_job_tests.rs"]
mod tests;
