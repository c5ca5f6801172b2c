// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job plugin contract and built-in plugins.
//!
//! A plugin is a named unit of work: the body receives the job's config and
//! a status channel, runs to completion inside a worker process, and reports
//! failure through [`PluginError`]. Bodies are blocking and may perform
//! arbitrary I/O; isolation is the worker process, not the body.

mod remote_call;
#[cfg(feature = "test-plugins")]
pub mod test_plugins;

pub use remote_call::RemoteCallPlugin;

use thiserror::Error;

use errand_client::{ClientError, RemoteApplyError, RemoteError, RemoteFailure, StatusChannel};
use errand_wire::Value;

/// A named work body the daemon can run as a job.
pub trait JobPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Run the body with the job's config.
    ///
    /// Runs inside a worker process whose stdout is reserved for the
    /// supervisor's failure pipe; publish progress through `status`, not by
    /// printing.
    fn run(&self, config: &Value, status: &dyn StatusChannel) -> Result<(), PluginError>;
}

impl std::fmt::Debug for dyn JobPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("JobPlugin").field(&self.name()).finish()
    }
}

/// How a plugin body failed.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A nested remote call failed. The received chain is forwarded
    /// unchanged so the whole call tree stays visible at the first caller.
    #[error("{0}")]
    Remote(#[from] RemoteFailure),

    /// Any other failure, tagged for possible reconstruction on the caller's
    /// machine.
    #[error("{message}")]
    Failed {
        type_name: String,
        message: String,
        exception_object: Option<serde_json::Value>,
    },
}

impl PluginError {
    pub fn failed(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            type_name: type_name.into(),
            message: message.into(),
            exception_object: None,
        }
    }

    /// Capture a transportable error with its tag and serialized object.
    pub fn typed<E: RemoteError>(error: E) -> Self {
        Self::Failed {
            type_name: E::KIND.to_string(),
            message: error.to_string(),
            exception_object: serde_json::to_value(&error).ok(),
        }
    }
}

impl From<ClientError> for PluginError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Remote(failure) => PluginError::Remote(failure),
            other => PluginError::failed("ClientError", other.to_string()),
        }
    }
}

impl From<RemoteApplyError> for PluginError {
    fn from(error: RemoteApplyError) -> Self {
        match error {
            RemoteApplyError::Failed { type_name, message, exception_object } => {
                // A shipped RemoteFailure means a nested call failed inside
                // the remotable body; splice the chain back together instead
                // of flattening it into a leaf.
                if type_name == RemoteFailure::KIND {
                    if let Some(object) = &exception_object {
                        if let Ok(failure) =
                            serde_json::from_value::<RemoteFailure>(object.clone())
                        {
                            return PluginError::Remote(failure);
                        }
                    }
                }
                PluginError::Failed { type_name, message, exception_object }
            }
            other => PluginError::failed("RemoteApplyError", other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "plugins_tests.rs"]
mod tests;
