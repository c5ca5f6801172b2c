// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin registry: the seam through which work enters the daemon.
//!
//! The registry maps plugin names to bodies. It is built from explicit
//! [`PluginSet`] providers handed to the constructor; `refresh` re-collects
//! every provider so plugin sets that appeared since startup become visible.
//! Refresh happens only through `PUT /reload`; listing reads the current
//! snapshot.
//!
//! The manager depends only on `resolve`/`list`, not on how discovery works.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::plugins::{JobPlugin, RemoteCallPlugin};
use errand_client::RemotableSet;
use errand_core::JobError;

/// Provides a batch of plugins; re-collected on every refresh.
pub trait PluginSet: Send + Sync {
    fn plugins(&self) -> Vec<Arc<dyn JobPlugin>>;
}

/// A fixed batch of plugins.
pub struct StaticPlugins(Vec<Arc<dyn JobPlugin>>);

impl StaticPlugins {
    pub fn new(plugins: Vec<Arc<dyn JobPlugin>>) -> Self {
        Self(plugins)
    }
}

impl PluginSet for StaticPlugins {
    fn plugins(&self) -> Vec<Arc<dyn JobPlugin>> {
        self.0.clone()
    }
}

/// The system plugins every daemon carries: the remotify pair.
pub struct BuiltinPlugins {
    remotables: Arc<RemotableSet>,
}

impl BuiltinPlugins {
    pub fn new(remotables: Arc<RemotableSet>) -> Self {
        Self { remotables }
    }
}

impl PluginSet for BuiltinPlugins {
    fn plugins(&self) -> Vec<Arc<dyn JobPlugin>> {
        vec![
            Arc::new(RemoteCallPlugin::function(Arc::clone(&self.remotables))),
            Arc::new(RemoteCallPlugin::method(Arc::clone(&self.remotables))),
        ]
    }
}

/// Name → body mapping for every loadable plugin.
pub struct PluginRegistry {
    sources: Vec<Arc<dyn PluginSet>>,
    plugins: RwLock<HashMap<String, Arc<dyn JobPlugin>>>,
}

impl PluginRegistry {
    pub fn new(sources: Vec<Arc<dyn PluginSet>>) -> Self {
        let registry = Self { sources, plugins: RwLock::new(HashMap::new()) };
        registry.refresh();
        registry
    }

    /// The standard daemon registry: system plugins over `remotables`, plus
    /// any extra sources the embedding binary supplies.
    pub fn builtin(
        remotables: Arc<RemotableSet>,
        extra: Vec<Arc<dyn PluginSet>>,
    ) -> Self {
        let mut sources: Vec<Arc<dyn PluginSet>> =
            vec![Arc::new(BuiltinPlugins::new(remotables))];
        sources.extend(extra);
        Self::new(sources)
    }

    /// Every currently registered plugin name, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The body registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn JobPlugin>, JobError> {
        self.plugins
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| JobError::NoSuchPlugin(name.to_string()))
    }

    /// Re-collect every provider. Idempotent; observable through `list`.
    pub fn refresh(&self) {
        let mut collected = HashMap::new();
        for source in &self.sources {
            for plugin in source.plugins() {
                collected.insert(plugin.name().to_string(), plugin);
            }
        }
        tracing::debug!(count = collected.len(), "plugin registry refreshed");
        *self.plugins.write() = collected;
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
