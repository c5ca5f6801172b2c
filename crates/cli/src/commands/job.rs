// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job commands: create, start, info, running.

use errand_client::{ClientError, RemoteServer};
use errand_core::JobId;
use errand_wire::Value;

/// Create a job; `config` is a path to a JSON file or an inline literal.
pub fn create(
    server: &RemoteServer,
    name: &str,
    config: &str,
    start: bool,
) -> Result<(), ClientError> {
    let config = load_config(config)?;
    let mut job = server.create_job(name, config)?;
    if start {
        job.start()?;
    }
    println!("UUID: {}", job.id());
    Ok(())
}

pub fn start(server: &RemoteServer, id: &str) -> Result<(), ClientError> {
    let mut job = server.get_job(JobId::from_string(id))?;
    job.start()?;
    println!("Job Started");
    Ok(())
}

pub fn info(server: &RemoteServer, id: &str) -> Result<(), ClientError> {
    let mut job = server.get_job(JobId::from_string(id))?;
    println!("Config: {}", pretty(&job.config(false)?));
    match job.status(false) {
        Ok(status) => {
            println!("Status: {}", pretty(&status));
            println!("Running: {}", job.running(false)?);
            println!("Finished: {}", job.finished(false)?);
        }
        Err(ClientError::Remote(failure)) => {
            println!("Job raised an exception during execution.");
            println!("{failure}");
            println!("Running: {}", job.running(false)?);
        }
        Err(error) => return Err(error),
    }
    Ok(())
}

pub fn running(server: &RemoteServer) -> Result<(), ClientError> {
    let jobs = server.running_jobs()?;
    println!("Currently running jobs:");
    for view in jobs {
        println!("  {} ({})", view.uuid, view.name);
    }
    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}

fn load_config(arg: &str) -> Result<Value, ClientError> {
    let text = match std::fs::read_to_string(arg) {
        Ok(contents) => contents,
        // Not a readable file: treat the argument as the config itself.
        Err(_) => arg.to_string(),
    };
    errand_wire::decode(text.as_bytes()).map_err(ClientError::from)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
