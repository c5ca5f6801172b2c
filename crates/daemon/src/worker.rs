// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-process entry point.
//!
//! The supervisor re-executes the daemon binary with the hidden `worker`
//! subcommand, handing it the plugin name, job id, auth token, and server
//! port as arguments and the encoded config on stdin. The body publishes
//! progress through the network status updater; stdout carries at most one
//! JSON failure record, written just before a non-zero exit.
//!
//! Failure classification preserves provenance: a caught remote failure
//! (a nested remote call that failed) is forwarded as a new frame around
//! the received chain, unchanged; anything else becomes a fresh leaf.

use std::io::Read;

use crate::plugins::PluginError;
use crate::registry::PluginRegistry;
use errand_client::StatusUpdater;
use errand_core::{AuthToken, FailureLeaf, FailureRecord, JobId};

pub struct WorkerArgs {
    pub plugin: String,
    pub id: JobId,
    pub token: AuthToken,
    pub server_port: u16,
}

impl WorkerArgs {
    fn host(&self) -> String {
        format!("localhost:{}", self.server_port)
    }
}

/// Run one job body to completion. Returns the process exit code.
pub fn run(args: &WorkerArgs, registry: &PluginRegistry) -> i32 {
    match run_body(args, registry) {
        Ok(()) => {
            tracing::debug!(job = %args.id, "finished running");
            0
        }
        Err(error) => {
            tracing::error!(job = %args.id, error = %error, "job body failed");
            deliver_failure(args, error);
            1
        }
    }
}

fn run_body(args: &WorkerArgs, registry: &PluginRegistry) -> Result<(), PluginError> {
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| PluginError::failed("Io", format!("could not read config: {e}")))?;
    let config = errand_wire::decode(&input)
        .map_err(|e| PluginError::failed("MalformedPayload", e.to_string()))?;

    let plugin = registry
        .resolve(&args.plugin)
        .map_err(|e| PluginError::failed("NoSuchPlugin", e.to_string()))?;
    let updater = StatusUpdater::new(&args.host(), args.id.clone(), args.token.clone())
        .map_err(PluginError::from)?;

    tracing::debug!(job = %args.id, plugin = %args.plugin, "running job body");
    plugin.run(&config, &updater)
}

/// Write the single failure record to the one-shot pipe (stdout).
fn deliver_failure(args: &WorkerArgs, error: PluginError) {
    let record = classify(args, error);
    match serde_json::to_string(&record) {
        Ok(line) => {
            use std::io::Write;
            let mut stdout = std::io::stdout();
            let _ = writeln!(stdout, "{line}");
            let _ = stdout.flush();
        }
        Err(e) => tracing::error!(job = %args.id, error = %e, "failure record did not serialize"),
    }
}

fn classify(args: &WorkerArgs, error: PluginError) -> FailureRecord {
    match error {
        PluginError::Remote(failure) => {
            let traceback = frame_context(args, "nested remote call failed");
            FailureRecord::wrap(traceback, failure.record)
                .at(args.id.as_str(), args.host())
        }
        PluginError::Failed { type_name, message, exception_object } => {
            let traceback = frame_context(args, &message);
            let mut leaf = FailureLeaf::new(type_name, message);
            leaf.exception_object = exception_object;
            FailureRecord::from_leaf(traceback, leaf).at(args.id.as_str(), args.host())
        }
    }
}

/// The rendered stack context for this frame: where the job ran and what it
/// observed. The Rust analog of the interpreter traceback the wire format's
/// `traceback` field was designed around.
fn frame_context(args: &WorkerArgs, observed: &str) -> String {
    format!(
        "worker '{plugin}' (job {id}) on {host}\n  observed: {observed}",
        plugin = args.plugin,
        id = args.id,
        host = args.host(),
    )
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
