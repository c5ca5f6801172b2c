// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job registry.
//!
//! The manager owns the id → record map, the only shared mutable collection
//! in the daemon. Critical sections are short: insert and lookup here; the
//! record itself is the unit of mutation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::job::Job;
use crate::registry::PluginRegistry;
use crate::supervisor::{SpawnError, WorkerSpawner};
use errand_core::{JobError, JobId};
use errand_wire::Value;

/// Errors from manager operations: lifecycle errors plus spawn failures.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] SpawnError),
}

pub struct JobManager {
    registry: Arc<PluginRegistry>,
    spawner: Arc<dyn WorkerSpawner>,
    /// Port handed to jobs created without an explicit one.
    default_port: u16,
    jobs: Mutex<HashMap<JobId, Arc<Job>>>,
}

impl JobManager {
    pub fn new(
        registry: Arc<PluginRegistry>,
        spawner: Arc<dyn WorkerSpawner>,
        default_port: u16,
    ) -> Self {
        Self { registry, spawner, default_port, jobs: Mutex::new(HashMap::new()) }
    }

    /// Allocate id and auth token, store the record, optionally start it.
    /// Fails with [`JobError::NoSuchPlugin`] for unknown names.
    pub fn create(
        &self,
        name: &str,
        config: Value,
        start_now: bool,
        port: Option<u16>,
    ) -> Result<Arc<Job>, ManagerError> {
        self.registry.resolve(name)?;
        let job = Arc::new(Job::new(name, config, port.unwrap_or(self.default_port)));
        tracing::info!(job = %job.id(), plugin = name, "job created");
        self.jobs.lock().insert(job.id().clone(), Arc::clone(&job));
        if start_now {
            self.start(&job)?;
        }
        Ok(job)
    }

    pub fn get(&self, id: &str) -> Result<Arc<Job>, JobError> {
        self.jobs
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| JobError::NoSuchJob(JobId::from_string(id)))
    }

    /// Every job created since startup, in no particular order.
    pub fn list(&self) -> Vec<Arc<Job>> {
        self.jobs.lock().values().cloned().collect()
    }

    pub fn list_running(&self) -> Vec<Arc<Job>> {
        self.jobs.lock().values().filter(|job| job.running()).cloned().collect()
    }

    pub fn start(&self, job: &Job) -> Result<(), ManagerError> {
        job.start(self.spawner.as_ref())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
