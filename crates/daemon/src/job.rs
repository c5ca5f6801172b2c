// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The server-side job record.
//!
//! A record is created by the manager and lives in memory for the daemon's
//! lifetime. Its state is derived, never stored: Created until `start`,
//! Running while the worker is alive, Finished when it exits, Killed via
//! `kill`. `start` is one-shot. The auth token gates status updates and
//! never appears in the external view.

use parking_lot::Mutex;

use crate::manager::ManagerError;
use crate::supervisor::{WorkerHandle, WorkerSpawner, WorkerSpec};
use errand_core::{AuthToken, FailureRecord, JobError, JobId};
use errand_wire::{JobView, StatusMap, Value};

#[derive(Debug)]
pub struct Job {
    id: JobId,
    name: String,
    config: Value,
    auth_token: AuthToken,
    server_port: u16,
    inner: Mutex<JobInner>,
}

#[derive(Debug, Default)]
struct JobInner {
    status: StatusMap,
    worker: Option<WorkerHandle>,
    started: bool,
    killed: bool,
}

impl Job {
    pub fn new(name: impl Into<String>, config: Value, server_port: u16) -> Self {
        Self {
            id: JobId::new(),
            name: name.into(),
            config,
            auth_token: AuthToken::new(),
            server_port,
            inner: Mutex::new(JobInner::default()),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// The per-job shared secret. Leaves the record only as part of the
    /// worker spawn parameters.
    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    /// Spawn the worker. Fails with [`JobError::AlreadyStarted`] on any
    /// re-entry, whether or not the first worker still runs.
    pub fn start(&self, spawner: &dyn WorkerSpawner) -> Result<(), ManagerError> {
        let mut inner = self.inner.lock();
        if inner.started {
            return Err(JobError::AlreadyStarted(self.id.clone()).into());
        }
        tracing::debug!(job = %self.id, plugin = %self.name, "starting job");
        let handle = spawner.spawn(WorkerSpec {
            plugin: self.name.clone(),
            id: self.id.clone(),
            auth_token: self.auth_token.clone(),
            server_port: self.server_port,
            config: self.config.clone(),
        })?;
        inner.worker = Some(handle);
        inner.started = true;
        Ok(())
    }

    /// True while the worker process is alive.
    pub fn running(&self) -> bool {
        self.inner.lock().worker.as_ref().map(WorkerHandle::alive).unwrap_or(false)
    }

    pub fn killed(&self) -> bool {
        self.inner.lock().killed
    }

    /// True once the worker has run and is no longer alive. Fails with
    /// [`JobError::NotStarted`] when no worker was ever spawned.
    pub fn finished(&self) -> Result<bool, JobError> {
        let inner = self.inner.lock();
        match &inner.worker {
            Some(worker) => Ok(!worker.alive()),
            None => Err(JobError::NotStarted(self.id.clone())),
        }
    }

    /// Signal the worker to terminate. Killing an already-finished job is
    /// accepted and only flags the record; there is no process-level effect.
    pub fn kill(&self) -> Result<(), JobError> {
        let mut inner = self.inner.lock();
        match &inner.worker {
            Some(worker) => {
                tracing::debug!(job = %self.id, "terminating job");
                worker.kill();
                inner.killed = true;
                Ok(())
            }
            None => Err(JobError::NotStarted(self.id.clone())),
        }
    }

    /// Merge a status update. Later updates overwrite matching keys and
    /// leave the rest of the map untouched.
    pub fn update_status(&self, api_key: &str, update: StatusMap) -> Result<(), JobError> {
        if api_key != self.auth_token.as_str() {
            return Err(JobError::NotAuthorized);
        }
        let mut inner = self.inner.lock();
        inner.status.extend(update);
        tracing::debug!(job = %self.id, "status updated");
        Ok(())
    }

    /// The merged status. Drains the supervisor's failure pipe first: once a
    /// failure record has arrived it is stored under `exception` for good.
    pub fn status(&self) -> StatusMap {
        let mut inner = self.inner.lock();
        let record = inner.worker.as_ref().and_then(WorkerHandle::poll_failure);
        if let Some(record) = record {
            tracing::warn!(job = %self.id, "worker delivered a failure record");
            inner.status.insert("exception".to_string(), failure_to_value(&record));
        }
        inner.status.clone()
    }

    /// Wire-serializable projection. Never carries the auth token.
    pub fn to_view(&self) -> JobView {
        JobView {
            uuid: self.id.as_str().to_string(),
            name: self.name.clone(),
            config: self.config.clone(),
            status: self.status(),
            running: self.running(),
            killed: self.killed(),
            finished: self.finished().unwrap_or(false),
        }
    }
}

fn failure_to_value(record: &FailureRecord) -> Value {
    let json = match serde_json::to_value(record) {
        Ok(json) => json,
        Err(_) => return Value::String(record.to_string()),
    };
    match Value::from_json(json) {
        Ok(value) => value,
        Err(_) => Value::String(record.to_string()),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
