// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn create_request_defaults() {
    let req: CreateJobRequest = serde_json::from_str(r#"{"name": "mul"}"#).unwrap();
    assert_eq!(req.name, "mul");
    assert_eq!(req.config, Value::empty_map());
    assert!(!req.running);
    assert!(req.port.is_none());
}

#[test]
fn create_request_with_extended_config() {
    let req: CreateJobRequest = serde_json::from_str(
        r#"{"name": "copy", "config": {"deadline": {"$date": 1700000000000}}, "port": 5001}"#,
    )
    .unwrap();
    assert_eq!(req.config.get("deadline"), Some(&Value::DateTime(1_700_000_000_000)));
    assert_eq!(req.port, Some(5001));
}

#[test]
fn status_update_without_status_is_accepted() {
    let req: StatusUpdateRequest = serde_json::from_str(r#"{"api_key": "key-x"}"#).unwrap();
    assert_eq!(req.api_key, "key-x");
    assert!(req.status.is_none());
}

#[test]
fn job_view_roundtrips() {
    let view = JobView {
        uuid: "job-1".into(),
        name: "mul".into(),
        config: [("a".to_string(), Value::Int(17))].into_iter().collect(),
        status: [("progress".to_string(), Value::Float(0.5))].into_iter().collect(),
        running: true,
        killed: false,
        finished: false,
    };
    let json = serde_json::to_string(&view).unwrap();
    let parsed: JobView = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, view);
}

#[test]
fn job_view_wire_keys() {
    let view = JobView {
        uuid: "job-1".into(),
        name: "mul".into(),
        config: Value::empty_map(),
        status: StatusMap::new(),
        running: false,
        killed: false,
        finished: false,
    };
    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("uuid").is_some());
    assert!(json.get("id").is_none());
}

#[test]
fn error_body_shape() {
    let body = ErrorBody { error: "Job plugin 'Bad Name' does not exist".into() };
    let json = serde_json::to_string(&body).unwrap();
    assert_eq!(json, r#"{"error":"Job plugin 'Bad Name' does not exist"}"#);
}
