// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::poll::ManualClock;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Minimal canned HTTP server: serves scripted responses in order (the last
/// one repeats), counting requests. Good enough for a blocking client that
/// sends one request per connection.
fn canned_server(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    std::thread::spawn(move || {
        let mut served = 0usize;
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf);
            let (code, body) = &responses[served.min(responses.len() - 1)];
            served += 1;
            let reason = match *code {
                200 => "OK",
                400 => "Bad Request",
                401 => "Unauthorized",
                403 => "Forbidden",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {code} {reason}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (addr, hits)
}

fn view_json(running: bool, finished: bool, status: serde_json::Value) -> String {
    serde_json::json!({
        "uuid": "job-test",
        "name": "mul",
        "config": {"a": 17, "b": 13.5},
        "status": status,
        "running": running,
        "killed": false,
        "finished": finished,
    })
    .to_string()
}

fn failed_view() -> String {
    view_json(
        false,
        true,
        serde_json::json!({
            "exception": {
                "traceback": "worker frame",
                "previous_exception": {
                    "type": "TypeError",
                    "message": "THE SKY IS FALLING!!",
                }
            }
        }),
    )
}

#[test]
fn attach_populates_caches_from_view() {
    let (addr, hits) = canned_server(vec![(200, view_json(true, false, serde_json::json!({})))]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();

    assert_eq!(job.id().as_str(), "job-test");
    assert_eq!(job.name(), "mul");
    let config = job.config(false).unwrap();
    assert_eq!(config.get("a").and_then(Value::as_i64), Some(17));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn refresh_is_rate_limited_unless_forced() {
    let clock = ManualClock::new();
    let (addr, hits) = canned_server(vec![(200, view_json(true, false, serde_json::json!({})))]);
    let mut job = RemoteJob::attach_with_clock(
        &addr,
        errand_core::JobId::from_string("job-test"),
        clock.clone(),
    )
    .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Inside the window: cached view answers, no GET goes out.
    for _ in 0..3 {
        assert!(job.running(false).unwrap());
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Window elapsed: exactly one more GET.
    clock.advance(REFRESH_INTERVAL + Duration::from_millis(1));
    assert!(job.running(false).unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // Forced: always a GET.
    assert!(job.running(true).unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn create_adopts_server_assigned_id() {
    let view = view_json(false, false, serde_json::json!({}));
    let (addr, hits) = canned_server(vec![(200, view.clone()), (200, view)]);
    let job = RemoteJob::create(&addr, "mul", Value::empty_map()).unwrap();

    assert_eq!(job.id().as_str(), "job-test");
    // One POST to create, one GET to populate.
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn create_maps_400_to_no_such_plugin() {
    let (addr, _) =
        canned_server(vec![(400, r#"{"error":"Job plugin 'Bad Name' does not exist"}"#.into())]);
    let err = RemoteJob::create(&addr, "Bad Name", Value::empty_map()).unwrap_err();
    match err {
        ClientError::Job(JobError::NoSuchPlugin(name)) => assert_eq!(name, "Bad Name"),
        other => panic!("expected NoSuchPlugin, got {other}"),
    }
}

#[test]
fn status_raises_remote_failure_with_full_chain() {
    let (addr, _) = canned_server(vec![(200, failed_view())]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();

    let err = job.status(false).unwrap_err();
    let ClientError::Remote(failure) = err else {
        panic!("expected RemoteFailure");
    };
    let leaf = failure.leaf().unwrap();
    assert_eq!(leaf.type_name, "TypeError");
    assert_eq!(leaf.message, "THE SKY IS FALLING!!");
    assert!(!failure.record.traceback.is_empty());
}

#[test]
fn finished_consults_status() {
    let (addr, _) = canned_server(vec![(200, failed_view())]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();
    assert!(matches!(job.finished(false), Err(ClientError::Remote(_))));
}

#[test]
fn start_maps_404_and_403() {
    let view = view_json(false, false, serde_json::json!({}));
    let (addr, _) = canned_server(vec![(200, view.clone()), (404, "{}".into())]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();
    assert!(matches!(job.start(), Err(ClientError::Job(JobError::NoSuchJob(_)))));

    let (addr, _) = canned_server(vec![(200, view), (403, "{}".into())]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();
    assert!(matches!(job.start(), Err(ClientError::Job(JobError::AlreadyStarted(_)))));
}

#[test]
fn kill_maps_403_to_not_started() {
    let view = view_json(false, false, serde_json::json!({}));
    let (addr, _) = canned_server(vec![(200, view), (403, "{}".into())]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();
    assert!(matches!(job.kill(false), Err(ClientError::Job(JobError::NotStarted(_)))));
}

#[test]
fn any_500_is_internal_server_error() {
    let (addr, _) = canned_server(vec![(500, "<boom>".into())]);
    let err =
        RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap_err();
    assert!(matches!(err, ClientError::InternalServerError));
}

#[test]
fn join_times_out_with_job_id_in_rendering() {
    let (addr, _) = canned_server(vec![(200, view_json(true, false, serde_json::json!({})))]);
    let mut job = RemoteJob::attach(&addr, errand_core::JobId::from_string("job-test")).unwrap();

    let err = job.join(Some(Duration::ZERO)).unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(err.to_string().contains("job-test"));
}

#[test]
fn unreachable_daemon_fails_construction() {
    let err = RemoteJob::attach("127.0.0.1:1", errand_core::JobId::from_string("job-x"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Unreachable(_)));
}
