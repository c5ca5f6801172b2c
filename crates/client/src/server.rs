// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to a remote errand daemon as a whole.
//!
//! Wraps the daemon-level endpoints: plugin listing, registry reload,
//! running jobs, and job creation/lookup.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::ClientError;
use crate::remote_job::RemoteJob;
use crate::transport::Transport;
use errand_core::JobId;
use errand_wire::{JobView, JobsResponse, PluginsResponse, Value};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Used to communicate with a remote errand daemon.
pub struct RemoteServer {
    transport: Transport,
}

impl RemoteServer {
    /// `address` is `host` or `host:port`.
    pub fn new(address: &str) -> Result<Self, ClientError> {
        Ok(Self { transport: Transport::new(address)? })
    }

    /// `host:port` this handle targets.
    pub fn addr(&self) -> String {
        self.transport.addr()
    }

    /// True when something is listening on the daemon's port.
    pub fn is_available(&self) -> bool {
        let addrs = match (self.transport.host(), self.transport.port()).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(_) => return false,
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok() {
                return true;
            }
        }
        false
    }

    /// Wait until the daemon is reachable, probing every `retry_period` at
    /// most `retries` times.
    pub fn wait_for_available(
        &self,
        retry_period: Duration,
        retries: u32,
    ) -> Result<(), ClientError> {
        for attempt in 0..retries {
            if self.is_available() {
                return Ok(());
            }
            tracing::debug!(attempt, addr = %self.addr(), "daemon not reachable yet");
            std::thread::sleep(retry_period);
        }
        Err(ClientError::ServerUnavailable {
            addr: self.addr(),
            secs: (retry_period * retries).as_secs(),
        })
    }

    /// Create a job running `plugin_name` with `config`.
    pub fn create_job(&self, plugin_name: &str, config: Value) -> Result<RemoteJob, ClientError> {
        RemoteJob::create(&self.addr(), plugin_name, config)
    }

    /// Attach to the job identified by `id`.
    pub fn get_job(&self, id: JobId) -> Result<RemoteJob, ClientError> {
        RemoteJob::attach(&self.addr(), id)
    }

    /// Views of the jobs that are currently running.
    pub fn running_jobs(&self) -> Result<Vec<JobView>, ClientError> {
        let (_, body) = self.transport.get("/jobs/running")?;
        let parsed: JobsResponse = serde_json::from_slice(&body)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        Ok(parsed.jobs)
    }

    /// Names of every loaded job plugin.
    pub fn job_plugins(&self) -> Result<Vec<String>, ClientError> {
        let (_, body) = self.transport.get("/job_plugins")?;
        let parsed: PluginsResponse = serde_json::from_slice(&body)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        Ok(parsed.job_plugins)
    }

    /// Ask the daemon to rescan its plugin environment so plugin sets
    /// installed since startup become visible.
    pub fn reload(&self) -> Result<(), ClientError> {
        self.transport.put_empty("/reload")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
