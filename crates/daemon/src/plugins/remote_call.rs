// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System plugins backing the remotify layer.
//!
//! A remotified call arrives as a job whose config names the function, its
//! argument sequence, and (for methods) the serialized receiver. The body
//! resolves the adapter in the daemon's remotable set, applies it, and
//! stores the normalized return values under `status.return_values`.

use std::sync::Arc;

use errand_client::{
    RemotableSet, RemoteApplyError, StatusChannel, REMOTE_FUNCTION_PLUGIN, REMOTE_METHOD_PLUGIN,
};
use errand_wire::{StatusMap, Value};

use super::{JobPlugin, PluginError};

/// Re-applies a remotified callable to its deserialized arguments.
pub struct RemoteCallPlugin {
    name: &'static str,
    remotables: Arc<RemotableSet>,
}

impl RemoteCallPlugin {
    /// The free-function variant: no receiver travels with the call.
    pub fn function(remotables: Arc<RemotableSet>) -> Self {
        Self { name: REMOTE_FUNCTION_PLUGIN, remotables }
    }

    /// The method variant: the serialized receiver arrives under the
    /// config's `instance` key.
    pub fn method(remotables: Arc<RemotableSet>) -> Self {
        Self { name: REMOTE_METHOD_PLUGIN, remotables }
    }
}

impl JobPlugin for RemoteCallPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, config: &Value, status: &dyn StatusChannel) -> Result<(), PluginError> {
        let function_name = config
            .get("function_name")
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::failed("BadConfig", "config is missing 'function_name'"))?;
        let module_name = config.get("module_name").and_then(Value::as_str).unwrap_or("");
        let args = config.get("args").and_then(Value::as_array).unwrap_or(&[]);
        let instance = config.get("instance");

        let mut progress = StatusMap::new();
        progress.insert("function".to_string(), Value::from(function_name));
        progress.insert("module".to_string(), Value::from(module_name));
        status.merge(progress)?;

        tracing::info!(function = function_name, module = module_name, "applying remotable");
        let remotable = self
            .remotables
            .lookup(function_name)
            .ok_or_else(|| RemoteApplyError::Unknown(function_name.to_string()))
            .map_err(PluginError::from)?;
        let values = remotable.apply(instance, args).map_err(PluginError::from)?;

        let mut result = StatusMap::new();
        result.insert("return_values".to_string(), Value::Array(values));
        status.merge(result)?;
        Ok(())
    }
}
