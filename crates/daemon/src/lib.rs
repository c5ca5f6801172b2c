// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! errand-daemon: the server side of the errand remote-execution service.
//!
//! The daemon keeps an in-memory registry of jobs. Each started job runs its
//! plugin body in an isolated worker process; the process boundary is what
//! keeps a crashing or state-corrupting body from touching the daemon.
//! Workers publish progress back over the job's authenticated status channel
//! and deliver failures through a one-shot pipe.
//!
//! Everything is plumbed explicitly: the plugin registry, the remotable set,
//! and the job manager are constructed in `main` and handed to the router.

pub mod env;
pub mod http;
pub mod job;
pub mod manager;
pub mod plugins;
pub mod registry;
pub mod supervisor;
pub mod worker;

pub use http::{router, AppState};
pub use job::Job;
pub use manager::{JobManager, ManagerError};
pub use plugins::{JobPlugin, PluginError};
pub use registry::{PluginRegistry, PluginSet, StaticPlugins};
pub use supervisor::{ProcessSpawner, SpawnError, WorkerHandle, WorkerSpawner, WorkerSpec};
