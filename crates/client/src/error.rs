// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use errand_core::{FailureLeaf, FailureRecord, JobError, JobId};
use errand_wire::CodecError;

/// Errors surfaced by the client library. Typed, never silently swallowed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure reaching the daemon.
    #[error(
        "Errand could not be contacted on host \"{0}\". Check that the \
         address and port are correct and that an errand daemon is running \
         on the host."
    )]
    Unreachable(String),

    /// `join` deadline reached. The handle stays valid; the caller may kill.
    #[error("Waiting for job {0} timed out")]
    Timeout(JobId),

    /// The daemon never became reachable while waiting for it.
    #[error("Errand server could not be reached on host \"{addr}\" after waiting {secs} seconds")]
    ServerUnavailable { addr: String, secs: u64 },

    /// A lifecycle error reconstructed from the daemon's response code.
    #[error(transparent)]
    Job(#[from] JobError),

    /// Any 500 from the daemon.
    #[error("Something went wrong on the server")]
    InternalServerError,

    /// Payload failed to encode or decode.
    #[error(transparent)]
    Malformed(#[from] CodecError),

    /// A failure record arrived for this job.
    #[error(transparent)]
    Remote(#[from] RemoteFailure),

    /// The daemon answered with a body the client cannot interpret.
    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    /// Request construction failed before anything was sent.
    #[error("http client error: {0}")]
    Http(String),
}

/// A remote job failed; carries the full failure chain.
///
/// The string rendering prints, for each level of the chain, the job id, the
/// host, and the traceback, followed by the root error type and message.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{record}")]
pub struct RemoteFailure {
    /// Host the failing job ran on.
    pub host: String,
    /// Id of the failing job.
    pub job_id: JobId,
    /// The failure chain delivered by the supervisor.
    pub record: FailureRecord,
}

impl RemoteFailure {
    /// Attach host and job id, labelling the top frame when the worker left
    /// it unlabelled.
    pub fn new(host: impl Into<String>, job_id: JobId, mut record: FailureRecord) -> Self {
        let host = host.into();
        if record.job_id.is_none() {
            record.job_id = Some(job_id.as_str().to_string());
        }
        if record.host.is_none() {
            record.host = Some(host.clone());
        }
        Self { host, job_id, record }
    }

    /// The root cause, when the chain bottoms out in one.
    pub fn leaf(&self) -> Option<&FailureLeaf> {
        self.record.leaf()
    }

    /// Try to re-instantiate the root error on this machine.
    ///
    /// Succeeds when the leaf's type tag matches `E` and its serialized
    /// object deserializes; otherwise the caller keeps the chain.
    pub fn reconstruct<E: crate::remotable::RemoteError>(&self) -> Option<E> {
        let leaf = self.leaf()?;
        if leaf.type_name != E::KIND {
            return None;
        }
        let object = leaf.exception_object.clone()?;
        serde_json::from_value(object).ok()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
