// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exerciser plugins for the workspace integration specs.
//!
//! Compiled in behind the `test-plugins` feature so the spec suite can
//! drive a real daemon through arithmetic, sleeping, failing, and
//! job-calls-job scenarios.

use std::sync::Arc;
use std::time::Duration;

use errand_client::{RemotableSet, RemoteError, RemoteJob, StatusChannel};
use errand_wire::{StatusMap, Value};

use super::{JobPlugin, PluginError};
use crate::registry::{PluginSet, StaticPlugins};

pub const MUL_PLUGIN: &str = "errand.test.mul";
pub const SLEEP_PLUGIN: &str = "errand.test.sleep";
pub const RAISE_PLUGIN: &str = "errand.test.raise";
pub const CALL_CHILD_PLUGIN: &str = "errand.test.call_child";

/// The full exerciser set.
pub fn test_plugin_set() -> Arc<dyn PluginSet> {
    Arc::new(StaticPlugins::new(vec![
        Arc::new(MulPlugin),
        Arc::new(SleepPlugin),
        Arc::new(RaisePlugin),
        Arc::new(CallChildPlugin),
    ]))
}

/// Register the remotified exerciser functions below.
pub fn register_test_remotables(remotables: &RemotableSet) {
    let _ = remotables.insert(mul_values_remotable());
    let _ = remotables.insert(minmax_remotable());
    let _ = remotables.insert(fail_if_negative_remotable());
}

fn require_f64(config: &Value, key: &str) -> Result<f64, PluginError> {
    config
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| PluginError::failed("BadConfig", format!("config is missing '{key}'")))
}

/// Multiplies `a` by `b` and reports the product as its return value.
pub struct MulPlugin;

impl JobPlugin for MulPlugin {
    fn name(&self) -> &str {
        MUL_PLUGIN
    }

    fn run(&self, config: &Value, status: &dyn StatusChannel) -> Result<(), PluginError> {
        let a = require_f64(config, "a")?;
        let b = require_f64(config, "b")?;
        let mut result = StatusMap::new();
        result.insert("return_values".to_string(), Value::Array(vec![Value::Float(a * b)]));
        status.merge(result)?;
        Ok(())
    }
}

/// Sleeps for `seconds`, publishing progress so pollers see a live job.
pub struct SleepPlugin;

impl JobPlugin for SleepPlugin {
    fn name(&self) -> &str {
        SLEEP_PLUGIN
    }

    fn run(&self, config: &Value, status: &dyn StatusChannel) -> Result<(), PluginError> {
        let seconds = config.get("seconds").and_then(Value::as_f64).unwrap_or(1.0);
        let mut state = StatusMap::new();
        state.insert("state".to_string(), Value::from("sleeping"));
        status.merge(state)?;

        let mut remaining = Duration::from_secs_f64(seconds.max(0.0));
        while remaining > Duration::ZERO {
            let step = remaining.min(Duration::from_millis(100));
            std::thread::sleep(step);
            remaining -= step;
        }

        let mut state = StatusMap::new();
        state.insert("state".to_string(), Value::from("done"));
        status.merge(state)?;
        Ok(())
    }
}

/// Always fails, with the message the failure-chain specs look for.
pub struct RaisePlugin;

impl JobPlugin for RaisePlugin {
    fn name(&self) -> &str {
        RAISE_PLUGIN
    }

    fn run(&self, _config: &Value, _status: &dyn StatusChannel) -> Result<(), PluginError> {
        Err(PluginError::failed("TypeError", "THE SKY IS FALLING!!"))
    }
}

/// Creates a child job on another daemon, starts it, and joins it —
/// propagating any remote failure so chains keep their provenance.
pub struct CallChildPlugin;

impl JobPlugin for CallChildPlugin {
    fn name(&self) -> &str {
        CALL_CHILD_PLUGIN
    }

    fn run(&self, config: &Value, status: &dyn StatusChannel) -> Result<(), PluginError> {
        let port = config
            .get("port")
            .and_then(Value::as_i64)
            .ok_or_else(|| PluginError::failed("BadConfig", "config is missing 'port'"))?;
        let plugin = config
            .get("plugin")
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::failed("BadConfig", "config is missing 'plugin'"))?;
        let child_config = config.get("config").cloned().unwrap_or_else(Value::empty_map);

        let mut child = RemoteJob::create(&format!("localhost:{port}"), plugin, child_config)?;
        let mut progress = StatusMap::new();
        progress.insert("child".to_string(), Value::from(child.id().as_str()));
        status.merge(progress)?;

        child.start()?;
        child.join(None)?;
        Ok(())
    }
}

/// Transportable error for the typed-reconstruction specs.
#[derive(Debug, PartialEq, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("input must not be negative, got {got}")]
pub struct NegativeInput {
    pub got: i64,
}

impl RemoteError for NegativeInput {
    const KIND: &'static str = "NegativeInput";
}

errand_client::remotify! {
    /// Reference multiplication used by the remotify round-trip specs.
    pub fn mul_values(a: i64, b: f64) -> f64 {
        a as f64 * b
    }
}

errand_client::remotify! {
    /// Tuple-return exerciser.
    pub fn minmax(values: Vec<i64>) -> (i64, i64) {
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        (min, max)
    }
}

errand_client::remotify! {
    /// Typed-error exerciser.
    pub fn fail_if_negative(n: i64) -> Result<i64, NegativeInput> {
        if n < 0 {
            return Err(NegativeInput { got: n });
        }
        Ok(n * 10)
    }
}
