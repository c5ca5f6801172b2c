// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle error taxonomy.
//!
//! These kinds are surface-independent: the HTTP layer maps them to status
//! codes, the client reconstructs them from status codes, and the manager
//! raises them directly. Message strings are part of the wire contract.

use thiserror::Error;

use crate::id::JobId;

/// Errors raised by job lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Requested plugin name is not in the registry.
    #[error("Job plugin '{0}' does not exist")]
    NoSuchPlugin(String),

    /// Job id is not known to the manager.
    #[error("Job with UUID: {0} does not exist")]
    NoSuchJob(JobId),

    /// `start` on a job that has ever been started.
    #[error("Job UUID: {0} you cannot start a job more than once")]
    AlreadyStarted(JobId),

    /// `kill` or `finished` on a job whose worker was never spawned.
    #[error("Job UUID: {0} has not been started")]
    NotStarted(JobId),

    /// Status update with a token that does not match the record's.
    #[error("You are not authorized to perform this action")]
    NotAuthorized,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
