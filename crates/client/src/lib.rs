// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! errand-client: client library for the errand daemon.
//!
//! [`RemoteJob`] is the handle to a job on a remote daemon: create or attach,
//! poll status, block on completion, reconstruct remote failures.
//! [`RemoteServer`] talks to the daemon itself (plugin listing, registry
//! reload, running jobs). The [`remotify!`] and [`remotify_impl!`] macros turn
//! ordinary functions and methods into remote calls.
//!
//! The library is deliberately blocking: its contract is poll/sleep
//! semantics, and worker processes use it from plain threads.

pub mod env;
pub mod error;
pub mod poll;
pub mod remotable;
pub mod remotify;
pub mod remote_job;
pub mod server;
pub mod status;
mod transport;

pub use error::{ClientError, RemoteFailure};
pub use poll::{ManualClock, PollClock, WallClock};
pub use remotable::{NameClash, Remotable, RemotableSet, RemoteApplyError, RemoteError};
pub use remotify::{
    RemoteCall, RemoteCallError, RemoteTarget, REMOTE_FUNCTION_PLUGIN, REMOTE_METHOD_PLUGIN,
};
pub use remote_job::{RemoteJob, POLL_INTERVAL, REFRESH_INTERVAL};
pub use server::RemoteServer;
pub use status::{MockStatusUpdater, StatusChannel, StatusUpdater};

/// Port an errand daemon listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;

// Re-exported for the remotify macros' generated code.
#[doc(hidden)]
pub use paste;
