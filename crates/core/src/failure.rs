// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive failure records.
//!
//! When a worker body fails, the supervisor delivers a [`FailureRecord`] to
//! the owning job. Each node carries the traceback of the frame where the
//! failure was observed; the chain bottoms out in a [`FailureLeaf`] naming
//! the root error. Jobs that call other jobs wrap the received chain
//! unchanged, so the whole call tree stays debuggable from the first
//! caller's machine.

use serde::{Deserialize, Serialize};

/// Upper bound on chain length enforced at construction.
///
/// Wrapping an already-full chain truncates its tail into a synthetic leaf
/// rather than growing without bound.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// One frame of a remote failure chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Rendered stack context from the frame that observed the failure.
    pub traceback: String,
    /// Id of the job this frame belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Host the job ran on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// The failure this frame observed; `None` when the cause is unknown.
    pub previous_exception: Option<FailureCause>,
}

/// What a frame observed: either a deeper frame or the root cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureCause {
    Chain(Box<FailureRecord>),
    Leaf(FailureLeaf),
}

/// Root cause of a failure chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureLeaf {
    /// Error type tag, e.g. `TypeError`.
    #[serde(rename = "type")]
    pub type_name: String,
    pub message: String,
    /// Serialized error value, when the type is transportable. Sufficient
    /// to re-instantiate the error on a machine where the type is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_object: Option<serde_json::Value>,
}

impl FailureLeaf {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), message: message.into(), exception_object: None }
    }

    pub fn with_object(mut self, object: serde_json::Value) -> Self {
        self.exception_object = Some(object);
        self
    }
}

impl FailureRecord {
    /// A single-frame record around a root cause.
    pub fn from_leaf(traceback: impl Into<String>, leaf: FailureLeaf) -> Self {
        Self {
            traceback: traceback.into(),
            job_id: None,
            host: None,
            previous_exception: Some(FailureCause::Leaf(leaf)),
        }
    }

    /// A new frame around a received chain, preserving it unchanged
    /// (up to the depth cap).
    pub fn wrap(traceback: impl Into<String>, previous: FailureRecord) -> Self {
        let previous = previous.capped(MAX_CHAIN_DEPTH - 1);
        Self {
            traceback: traceback.into(),
            job_id: None,
            host: None,
            previous_exception: Some(FailureCause::Chain(Box::new(previous))),
        }
    }

    pub fn at(mut self, job_id: impl Into<String>, host: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self.host = Some(host.into());
        self
    }

    /// Number of frames in the chain, this one included.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(FailureCause::Chain(next)) = &current.previous_exception {
            depth += 1;
            current = &**next;
        }
        depth
    }

    /// The root cause, when the chain bottoms out in one.
    pub fn leaf(&self) -> Option<&FailureLeaf> {
        let mut current = self;
        loop {
            match &current.previous_exception {
                Some(FailureCause::Chain(next)) => current = &**next,
                Some(FailureCause::Leaf(leaf)) => return Some(leaf),
                None => return None,
            }
        }
    }

    /// Frames from this one down to the deepest.
    pub fn frames(&self) -> impl Iterator<Item = &FailureRecord> {
        Frames { next: Some(self) }
    }

    /// Truncate the chain to at most `limit` frames, the part beyond the
    /// limit replaced by a synthetic leaf.
    fn capped(mut self, limit: usize) -> Self {
        self.previous_exception = match self.previous_exception {
            Some(FailureCause::Chain(_)) if limit <= 1 => {
                Some(FailureCause::Leaf(FailureLeaf::new(
                    "ChainTruncated",
                    format!("failure chain exceeded {MAX_CHAIN_DEPTH} frames"),
                )))
            }
            Some(FailureCause::Chain(next)) => {
                Some(FailureCause::Chain(Box::new(next.capped(limit - 1))))
            }
            other => other,
        };
        self
    }
}

struct Frames<'a> {
    next: Option<&'a FailureRecord>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a FailureRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = match &current.previous_exception {
            Some(FailureCause::Chain(next)) => Some(&**next),
            _ => None,
        };
        Some(current)
    }
}

impl std::fmt::Display for FailureRecord {
    /// Full rendering of the chain: per frame the job id, the host, and the
    /// traceback, followed by the root error type and message.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Full traceback for all jobs descended from current job:")?;
        for frame in self.frames() {
            writeln!(f, "   In job with UUID: {}", frame.job_id.as_deref().unwrap_or("unknown"))?;
            writeln!(f, "   Running on machine: {}", frame.host.as_deref().unwrap_or("unknown"))?;
            writeln!(f, "      Traceback:")?;
            for line in frame.traceback.lines() {
                writeln!(f, "         {line}")?;
            }
        }
        match self.leaf() {
            Some(leaf) => {
                writeln!(f, "   Root Error Type: {}", leaf.type_name)?;
                write!(f, "   Root Error Message: {}", leaf.message)
            }
            None => write!(f, "   Root Error: unknown"),
        }
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
