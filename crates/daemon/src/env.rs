// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Path of the worker executable the supervisor spawns.
///
/// `ERRAND_WORKER_BIN` overrides; the default is the running binary itself,
/// re-executed with the hidden `worker` subcommand.
pub fn worker_bin() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = std::env::var("ERRAND_WORKER_BIN") {
        return Ok(PathBuf::from(path));
    }
    std::env::current_exe()
}
