// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use errand_core::FailureLeaf;

fn record(message: &str) -> FailureRecord {
    FailureRecord::from_leaf("frame", FailureLeaf::new("TypeError", message))
}

fn spec() -> WorkerSpec {
    WorkerSpec {
        plugin: "errand.test.mul".to_string(),
        id: JobId::from_string("job-1"),
        auth_token: AuthToken::from_string("key-1"),
        server_port: 5000,
        config: Value::empty_map(),
    }
}

#[test]
fn poll_failure_is_single_delivery() {
    let (tx, rx) = oneshot::channel();
    let handle =
        WorkerHandle::new(Arc::new(AtomicBool::new(true)), CancellationToken::new(), rx);

    // Nothing yet.
    assert!(handle.poll_failure().is_none());

    tx.send(record("boom")).unwrap();
    let delivered = handle.poll_failure().unwrap();
    assert_eq!(delivered.leaf().unwrap().message, "boom");

    // Drained: the receiver is gone for good.
    assert!(handle.poll_failure().is_none());
}

#[test]
fn poll_failure_closes_on_sender_drop() {
    let (tx, rx) = oneshot::channel::<FailureRecord>();
    let handle =
        WorkerHandle::new(Arc::new(AtomicBool::new(true)), CancellationToken::new(), rx);
    drop(tx);
    assert!(handle.poll_failure().is_none());
    assert!(handle.poll_failure().is_none());
}

#[test]
fn kill_releases_the_failure_pipe() {
    let (tx, rx) = oneshot::channel();
    let handle =
        WorkerHandle::new(Arc::new(AtomicBool::new(true)), CancellationToken::new(), rx);

    handle.kill();
    // A record racing the kill is lost, by design.
    let _ = tx.send(record("late"));
    assert!(handle.poll_failure().is_none());
}

#[test]
fn parse_failure_reads_a_clean_record() {
    let json = serde_json::to_string(&record("boom")).unwrap();
    let parsed = parse_failure(json.as_bytes()).unwrap();
    assert_eq!(parsed.leaf().unwrap().message, "boom");
}

#[test]
fn parse_failure_skips_stray_output() {
    let json = serde_json::to_string(&record("boom")).unwrap();
    let noisy = format!("plugin printed this\n{json}\n");
    let parsed = parse_failure(noisy.as_bytes()).unwrap();
    assert_eq!(parsed.leaf().unwrap().message, "boom");
}

#[test]
fn parse_failure_empty_output_is_none() {
    assert!(parse_failure(b"").is_none());
    assert!(parse_failure(b"  \n").is_none());
    assert!(parse_failure(b"not json at all").is_none());
}

#[test]
fn fake_spawner_records_specs() {
    let spawner = FakeSpawner::new();
    let handle = spawner.spawn(spec()).unwrap();

    assert!(handle.alive());
    assert_eq!(spawner.spawned(), 1);
    assert_eq!(spawner.spec(0).plugin, "errand.test.mul");

    spawner.finish(0);
    assert!(!handle.alive());
}

#[test]
fn fake_spawner_delivers_failures() {
    let spawner = FakeSpawner::new();
    let handle = spawner.spawn(spec()).unwrap();

    spawner.fail(0, record("down"));
    assert!(!handle.alive());
    assert_eq!(handle.poll_failure().unwrap().leaf().unwrap().message, "down");
    assert!(handle.poll_failure().is_none());
}
