// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format for daemon communication.
//!
//! JSON payloads over HTTP, with extended scalar types (timestamps, binary
//! blobs, large integers, regular expressions, opaque ids) encoded as
//! single-key objects.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod dto;
mod value;

pub use dto::{
    CreateJobRequest, ErrorBody, JobView, JobsResponse, KilledResponse, PluginsResponse,
    StartedResponse, StatusUpdateRequest,
};
pub use value::{decode, encode, CodecError, StatusMap, Value};
