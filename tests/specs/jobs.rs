// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs: create, start, status, join, kill.

use std::time::Duration;

use crate::prelude::{wait_for, Daemon, SPEC_WAIT_MAX_MS};
use errand_client::{ClientError, RemoteJob};
use errand_core::JobError;
use errand_daemon::plugins::test_plugins::{MUL_PLUGIN, SLEEP_PLUGIN};
use errand_wire::{StatusMap, Value};

fn mul_config(a: i64, b: f64) -> Value {
    [
        ("a".to_string(), Value::Int(a)),
        ("b".to_string(), Value::Float(b)),
    ]
    .into_iter()
    .collect()
}

fn sleep_config(seconds: f64) -> Value {
    [("seconds".to_string(), Value::Float(seconds))].into_iter().collect()
}

#[test]
fn mul_job_round_trip() {
    let daemon = Daemon::start();
    let mut job = RemoteJob::create(&daemon.addr(), MUL_PLUGIN, mul_config(17, 13.5)).unwrap();

    assert!(job.start().unwrap());
    assert!(job.join(Some(Duration::from_secs(10))).unwrap());

    let status = job.status(true).unwrap();
    let values = status.get("return_values").and_then(Value::as_array).unwrap();
    assert_eq!(values, &[Value::Float(229.5)]);

    let unpacked: f64 = errand_client::remotify::unpack_return_values(values).unwrap();
    assert_eq!(unpacked, 229.5);
}

#[test]
fn missing_plugin_is_rejected() {
    let daemon = Daemon::start();
    let err = daemon.server().create_job("Bad Name", Value::empty_map()).unwrap_err();
    match err {
        ClientError::Job(JobError::NoSuchPlugin(_)) => {
            assert_eq!(err.to_string(), "Job plugin 'Bad Name' does not exist");
        }
        other => panic!("expected NoSuchPlugin, got {other}"),
    }
}

#[test]
fn double_start_is_rejected() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(5.0)).unwrap();

    assert!(job.start().unwrap());
    let err = job.start().unwrap_err();
    assert!(err.to_string().contains("you cannot start a job more than once"));
}

#[test]
fn unauthorized_update_leaves_status_empty() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), MUL_PLUGIN, mul_config(1, 1.0)).unwrap();

    let updater = errand_client::StatusUpdater::new(
        &daemon.addr(),
        job.id().clone(),
        errand_core::AuthToken::from_string("wrong"),
    )
    .unwrap();
    let mut update = StatusMap::new();
    update.insert("k".to_string(), Value::Int(1));
    let err = errand_client::StatusChannel::update(&updater, update).unwrap_err();
    assert!(matches!(err, ClientError::Job(JobError::NotAuthorized)));

    assert!(job.status(true).unwrap().is_empty());
}

#[test]
fn join_zero_timeout_names_the_job() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(30.0)).unwrap();
    job.start().unwrap();

    let err = job.join(Some(Duration::ZERO)).unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(err.to_string().contains(job.id().as_str()));

    // The handle stays valid after the deadline: kill and observe exit.
    assert!(job.kill(true).unwrap());
}

#[test]
fn join_deadline_fires_promptly() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(30.0)).unwrap();
    job.start().unwrap();

    let started = std::time::Instant::now();
    let err = job.join(Some(Duration::from_millis(300))).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(elapsed >= Duration::from_millis(300));
    // A few poll intervals of slack, not more.
    assert!(elapsed < Duration::from_secs(5), "join overshot its deadline: {elapsed:?}");

    job.kill(true).unwrap();
}

#[test]
fn kill_stops_a_running_job() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(30.0)).unwrap();
    job.start().unwrap();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        let mut probe = daemon.server().get_job(job.id().clone()).unwrap();
        probe.running(true).unwrap_or(false)
    }));

    assert!(job.kill(true).unwrap());

    // Kill is non-blocking; poll until the worker is observed dead.
    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        let mut probe = daemon.server().get_job(job.id().clone()).unwrap();
        !probe.running(true).unwrap_or(true)
    }));
}

#[test]
fn worker_status_updates_become_visible() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(2.0)).unwrap();
    job.start().unwrap();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        let mut probe = daemon.server().get_job(job.id().clone()).unwrap();
        match probe.status(true) {
            Ok(status) => status.get("state").is_some(),
            Err(_) => false,
        }
    }));

    job.join(Some(Duration::from_secs(10))).unwrap();
    let status = job.status(true).unwrap();
    assert_eq!(status.get("state").and_then(Value::as_str), Some("done"));
}

#[test]
fn plugin_listing_includes_system_and_test_plugins() {
    let daemon = Daemon::start();
    let names = daemon.server().job_plugins().unwrap();
    assert!(names.contains(&"errand.plugins.remote_function".to_string()));
    assert!(names.contains(&"errand.plugins.remote_method".to_string()));
    assert!(names.contains(&MUL_PLUGIN.to_string()));

    // Reload is idempotent and keeps the set stable.
    daemon.server().reload().unwrap();
    assert_eq!(daemon.server().job_plugins().unwrap(), names);
}

#[test]
fn running_listing_tracks_live_jobs() {
    let daemon = Daemon::start();
    let mut job =
        RemoteJob::create(&daemon.addr(), SLEEP_PLUGIN, sleep_config(10.0)).unwrap();

    assert!(daemon.server().running_jobs().unwrap().is_empty());
    job.start().unwrap();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        daemon
            .server()
            .running_jobs()
            .unwrap_or_default()
            .iter()
            .any(|view| view.uuid == job.id().as_str())
    }));

    job.kill(true).unwrap();
}
