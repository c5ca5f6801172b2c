// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker supervision: one isolated OS process per job.
//!
//! [`ProcessSpawner`] re-executes the daemon binary with the hidden `worker`
//! subcommand, feeding the encoded config on stdin. The child's stdout is
//! the one-shot failure pipe: a failing worker writes exactly one JSON
//! failure record there before exiting. A watcher task owns the child,
//! relays that record, flips the liveness flag on exit, and kills the
//! process when the handle's cancellation token fires.
//!
//! The parent never blocks on the worker: [`WorkerHandle::poll_failure`]
//! drains at most one record per poll and then closes its end.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use errand_core::{AuthToken, FailureRecord, JobId};
use errand_wire::{CodecError, Value};

/// Everything a spawner needs to start one worker.
#[derive(Debug, Clone)]
pub struct WorkerSpec {
    pub plugin: String,
    pub id: JobId,
    pub auth_token: AuthToken,
    /// Port the owning daemon listens on, so the worker's status channel
    /// targets back correctly.
    pub server_port: u16,
    pub config: Value,
}

/// Errors starting a worker.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("could not locate worker executable: {0}")]
    Executable(std::io::Error),

    #[error("failed to spawn worker process: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode worker config: {0}")]
    Config(#[from] CodecError),
}

/// Seam between the job record and how workers actually run.
pub trait WorkerSpawner: Send + Sync {
    fn spawn(&self, spec: WorkerSpec) -> Result<WorkerHandle, SpawnError>;
}

/// The record's reference to a spawned worker and its failure pipe.
#[derive(Debug)]
pub struct WorkerHandle {
    alive: Arc<AtomicBool>,
    kill: CancellationToken,
    failure: Mutex<Option<oneshot::Receiver<FailureRecord>>>,
}

impl WorkerHandle {
    pub fn new(
        alive: Arc<AtomicBool>,
        kill: CancellationToken,
        failure: oneshot::Receiver<FailureRecord>,
    ) -> Self {
        Self { alive, kill, failure: Mutex::new(Some(failure)) }
    }

    /// True while the worker process is running.
    pub fn alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Signal the worker to terminate. Non-blocking: the caller polls
    /// `alive` to observe termination. Releases the failure pipe, so a
    /// record racing the kill may be lost.
    pub fn kill(&self) {
        self.kill.cancel();
        *self.failure.lock() = None;
    }

    /// Drain at most one failure record. The pipe is single-delivery: after
    /// a record (or the pipe closing) this end is dropped for good.
    pub fn poll_failure(&self) -> Option<FailureRecord> {
        let mut slot = self.failure.lock();
        let receiver = slot.as_mut()?;
        match receiver.try_recv() {
            Ok(record) => {
                *slot = None;
                Some(record)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                *slot = None;
                None
            }
        }
    }
}

/// Spawns each worker as a real OS process.
pub struct ProcessSpawner;

impl WorkerSpawner for ProcessSpawner {
    fn spawn(&self, spec: WorkerSpec) -> Result<WorkerHandle, SpawnError> {
        let exe = crate::env::worker_bin().map_err(SpawnError::Executable)?;
        let config = errand_wire::encode(&spec.config)?;

        let mut child = tokio::process::Command::new(exe)
            .arg("worker")
            .arg("--plugin")
            .arg(&spec.plugin)
            .arg("--id")
            .arg(spec.id.as_str())
            .arg("--token")
            .arg(spec.auth_token.as_str())
            .arg("--port")
            .arg(spec.server_port.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let alive = Arc::new(AtomicBool::new(true));
        let kill = CancellationToken::new();
        let (failure_tx, failure_rx) = oneshot::channel();

        tokio::spawn(watch_worker(
            child_io(&mut child, config),
            child,
            Arc::clone(&alive),
            kill.clone(),
            failure_tx,
            spec.id,
        ));

        Ok(WorkerHandle::new(alive, kill, failure_rx))
    }
}

struct ChildIo {
    stdin: Option<tokio::process::ChildStdin>,
    stdout: Option<tokio::process::ChildStdout>,
    config: Vec<u8>,
}

fn child_io(child: &mut tokio::process::Child, config: Vec<u8>) -> ChildIo {
    ChildIo { stdin: child.stdin.take(), stdout: child.stdout.take(), config }
}

async fn watch_worker(
    io: ChildIo,
    mut child: tokio::process::Child,
    alive: Arc<AtomicBool>,
    kill: CancellationToken,
    failure_tx: oneshot::Sender<FailureRecord>,
    id: JobId,
) {
    // Hand over the config and close stdin so the worker sees EOF.
    if let Some(mut stdin) = io.stdin {
        use tokio::io::AsyncWriteExt;
        if let Err(e) = stdin.write_all(&io.config).await {
            tracing::warn!(job = %id, error = %e, "failed to write worker config");
        }
    }

    let drain_stdout = async move {
        let mut buf = Vec::new();
        if let Some(mut stdout) = io.stdout {
            let _ = stdout.read_to_end(&mut buf).await;
        }
        buf
    };

    tokio::select! {
        _ = kill.cancelled() => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            alive.store(false, Ordering::Release);
            tracing::debug!(job = %id, "worker killed");
        }
        buf = drain_stdout => {
            let status = child.wait().await;
            alive.store(false, Ordering::Release);
            match &status {
                Ok(code) => tracing::debug!(job = %id, code = ?code.code(), "worker exited"),
                Err(e) => tracing::warn!(job = %id, error = %e, "worker wait failed"),
            }
            if let Some(record) = parse_failure(&buf) {
                let _ = failure_tx.send(record);
            }
        }
    }
}

/// Extract the single failure record from the worker's stdout, tolerating
/// stray output from misbehaving bodies by scanning lines back to front.
fn parse_failure(buf: &[u8]) -> Option<FailureRecord> {
    let text = std::str::from_utf8(buf).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(record) = serde_json::from_str::<FailureRecord>(text) {
        return Some(record);
    }
    text.lines().rev().find_map(|line| serde_json::from_str(line.trim()).ok())
}

/// Test-support spawner: hands out handles whose liveness and failure
/// delivery the test drives by hand.
#[cfg(test)]
pub(crate) struct FakeSpawner {
    workers: Mutex<Vec<FakeWorker>>,
}

#[cfg(test)]
pub(crate) struct FakeWorker {
    pub spec: WorkerSpec,
    alive: Arc<AtomicBool>,
    failure_tx: Option<oneshot::Sender<FailureRecord>>,
}

#[cfg(test)]
impl FakeSpawner {
    pub fn new() -> Self {
        Self { workers: Mutex::new(Vec::new()) }
    }

    pub fn spawned(&self) -> usize {
        self.workers.lock().len()
    }

    pub fn spec(&self, index: usize) -> WorkerSpec {
        self.workers.lock()[index].spec.clone()
    }

    /// Worker exits normally.
    pub fn finish(&self, index: usize) {
        self.workers.lock()[index].alive.store(false, Ordering::Release);
    }

    /// Worker exits delivering a failure record.
    pub fn fail(&self, index: usize, record: FailureRecord) {
        let mut workers = self.workers.lock();
        let worker = &mut workers[index];
        worker.alive.store(false, Ordering::Release);
        if let Some(tx) = worker.failure_tx.take() {
            let _ = tx.send(record);
        }
    }
}

#[cfg(test)]
impl WorkerSpawner for FakeSpawner {
    fn spawn(&self, spec: WorkerSpec) -> Result<WorkerHandle, SpawnError> {
        let alive = Arc::new(AtomicBool::new(true));
        let kill = CancellationToken::new();
        let (failure_tx, failure_rx) = oneshot::channel();

        // A fake kill takes effect immediately; real kills are asynchronous.
        let killed_alive = Arc::clone(&alive);
        let killed_token = kill.clone();
        std::thread::spawn(move || {
            futures_block_on_cancel(killed_token, killed_alive);
        });

        self.workers.lock().push(FakeWorker {
            spec,
            alive: Arc::clone(&alive),
            failure_tx: Some(failure_tx),
        });
        Ok(WorkerHandle::new(alive, kill, failure_rx))
    }
}

/// Watch a fake worker from a plain thread: a cancelled token marks it dead,
/// like the real watcher task does after killing the process.
#[cfg(test)]
fn futures_block_on_cancel(token: CancellationToken, alive: Arc<AtomicBool>) {
    loop {
        if token.is_cancelled() {
            alive.store(false, Ordering::Release);
            return;
        }
        if !alive.load(Ordering::Acquire) {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
