// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure capture and exception bubbling specs.

use std::time::Duration;

use crate::prelude::Daemon;
use errand_client::{ClientError, RemoteJob};
use errand_daemon::plugins::test_plugins::{CALL_CHILD_PLUGIN, RAISE_PLUGIN};
use errand_wire::Value;

fn join_failure(job: &mut RemoteJob) -> errand_client::RemoteFailure {
    match job.join(Some(Duration::from_secs(20))) {
        Err(ClientError::Remote(failure)) => failure,
        other => panic!("expected RemoteFailure, got {other:?}"),
    }
}

fn call_child_config(port: u16, plugin: &str, child_config: Value) -> Value {
    [
        ("port".to_string(), Value::Int(i64::from(port))),
        ("plugin".to_string(), Value::from(plugin)),
        ("config".to_string(), child_config),
    ]
    .into_iter()
    .collect()
}

#[test]
fn worker_exception_reaches_the_client() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), RAISE_PLUGIN, Value::empty_map()).unwrap();
    job.start().unwrap();

    let failure = join_failure(&mut job);
    assert_eq!(failure.job_id, *job.id());
    assert!(!failure.record.traceback.is_empty());

    let leaf = failure.leaf().unwrap();
    assert_eq!(leaf.type_name, "TypeError");
    assert_eq!(leaf.message, "THE SKY IS FALLING!!");

    // The record is permanent: every later status read raises again.
    assert!(matches!(job.status(true), Err(ClientError::Remote(_))));

    // The rendering walks the whole chain.
    let rendered = failure.to_string();
    assert!(rendered.contains(job.id().as_str()));
    assert!(rendered.contains("Root Error Type: TypeError"));
}

#[test]
fn nested_call_preserves_both_frames() {
    let daemon = Daemon::start();
    let config = call_child_config(daemon.port, RAISE_PLUGIN, Value::empty_map());
    let mut job = RemoteJob::create(&daemon.addr(), CALL_CHILD_PLUGIN, config).unwrap();
    job.start().unwrap();

    let failure = join_failure(&mut job);
    assert_eq!(failure.record.depth(), 2);

    let frames: Vec<_> = failure.record.frames().collect();
    assert!(frames.iter().all(|frame| !frame.traceback.is_empty()));
    assert_eq!(frames[0].job_id.as_deref(), Some(job.id().as_str()));
    assert_ne!(frames[0].job_id, frames[1].job_id);

    assert_eq!(failure.leaf().unwrap().type_name, "TypeError");
    assert_eq!(failure.leaf().unwrap().message, "THE SKY IS FALLING!!");
}

#[test]
fn three_level_chain_keeps_every_frame() {
    let daemon = Daemon::start();
    let inner = call_child_config(daemon.port, RAISE_PLUGIN, Value::empty_map());
    let outer = call_child_config(daemon.port, CALL_CHILD_PLUGIN, inner);
    let mut job = RemoteJob::create(&daemon.addr(), CALL_CHILD_PLUGIN, outer).unwrap();
    job.start().unwrap();

    let failure = join_failure(&mut job);
    assert_eq!(failure.record.depth(), 3);
    assert!(failure.record.frames().all(|frame| !frame.traceback.is_empty()));

    // Three distinct jobs in the chain.
    let ids: Vec<_> = failure.record.frames().map(|f| f.job_id.clone()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(Option::is_some));
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);

    assert_eq!(failure.leaf().unwrap().message, "THE SKY IS FALLING!!");
}
