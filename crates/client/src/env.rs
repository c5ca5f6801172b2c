// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client crate.

use std::time::Duration;

/// HTTP timeout for daemon round trips.
///
/// `ERRAND_HTTP_TIMEOUT_MS` overrides; the default is 10 seconds.
pub fn http_timeout() -> Duration {
    std::env::var("ERRAND_HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}
