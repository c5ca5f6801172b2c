// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn mul_remotable() -> Remotable {
    Remotable::new("mul", "tests", |_instance, args| {
        let a: i64 = decode_arg(args, 0, "mul")?;
        let b: f64 = decode_arg(args, 1, "mul")?;
        single_return(&(a as f64 * b))
    })
}

#[test]
fn apply_decodes_args_and_encodes_return() {
    let remotable = mul_remotable();
    let values =
        remotable.apply(None, &[Value::Int(17), Value::Float(13.5)]).unwrap();
    assert_eq!(values, vec![Value::Float(229.5)]);
}

#[test]
fn missing_argument_reads_as_null_and_fails_typed_decode() {
    let remotable = mul_remotable();
    let err = remotable.apply(None, &[Value::Int(17)]).unwrap_err();
    assert!(matches!(err, RemoteApplyError::BadArgument { index: 1, .. }));
}

#[test]
fn set_refuses_reserved_prefixes() {
    let set = RemotableSet::new();
    let err = set
        .insert(Remotable::new("remote_thing", "tests", |_, _| unit_return()))
        .unwrap_err();
    assert_eq!(err, NameClash("remote_thing".to_string()));
    assert!(err.to_string().contains("cannot begin with \"remote_\" or \"async_\""));

    assert!(set
        .insert(Remotable::new("async_thing", "tests", |_, _| unit_return()))
        .is_err());
}

#[test]
fn set_registration_is_idempotent() {
    let set = RemotableSet::new();
    set.insert(mul_remotable()).unwrap();
    // Second attachment is a no-op, not an error and not a double-wrap.
    set.insert(Remotable::new("mul", "elsewhere", |_, _| unit_return())).unwrap();

    let kept = set.lookup("mul").unwrap();
    assert_eq!(kept.module(), "tests");
    assert_eq!(set.names(), vec!["mul".to_string()]);
}

#[test]
fn tuple_return_splits_fields() {
    let values = tuple_return(&(3i64, "x".to_string())).unwrap();
    assert_eq!(values, vec![Value::Int(3), Value::from("x")]);
}

#[test]
fn single_return_keeps_collections_whole() {
    let values = single_return(&vec![1i64, 2, 3]).unwrap();
    assert_eq!(
        values,
        vec![Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])]
    );
}

#[test]
fn from_typed_captures_tag_message_and_object() {
    #[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
    #[error("disk {disk} is full")]
    struct DiskFull {
        disk: String,
    }
    impl RemoteError for DiskFull {
        const KIND: &'static str = "DiskFull";
    }

    let err = RemoteApplyError::from_typed(DiskFull { disk: "sda".into() });
    let RemoteApplyError::Failed { type_name, message, exception_object } = err else {
        panic!("expected Failed");
    };
    assert_eq!(type_name, "DiskFull");
    assert_eq!(message, "disk sda is full");
    assert_eq!(exception_object, Some(serde_json::json!({"disk": "sda"})));
}

#[test]
fn remote_failure_is_transportable() {
    assert_eq!(RemoteFailure::KIND, "RemoteFailure");
}

#[test]
fn decode_instance_requires_a_value() {
    let err = decode_instance::<i64>(None, "m").unwrap_err();
    assert!(matches!(err, RemoteApplyError::MissingInstance(_)));
}
