// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::remotable::{RemotableSet, RemoteApplyError};
use errand_wire::Value;

crate::remotify! {
    /// Multiplies, the hard way.
    fn mul(a: i64, b: f64) -> f64 {
        a as f64 * b
    }
}

crate::remotify! {
    fn minmax(values: Vec<i64>) -> (i64, i64) {
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        (min, max)
    }
}

crate::remotify! {
    fn touch(_name: String) {}
}

#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize, PartialEq)]
#[error("n must be positive, got {got}")]
struct NotPositive {
    got: i64,
}

impl crate::remotable::RemoteError for NotPositive {
    const KIND: &'static str = "NotPositive";
}

crate::remotify! {
    fn half(n: i64) -> Result<i64, NotPositive> {
        if n <= 0 {
            return Err(NotPositive { got: n });
        }
        Ok(n / 2)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Counter {
    base: i64,
}

crate::remotify_impl! {
    impl Counter {
        /// Adds on top of the stored base.
        fn add(&self, x: i64) -> i64 {
            self.base + x
        }

        fn bounds(&self, spread: i64) -> (i64, i64) {
            (self.base - spread, self.base + spread)
        }
    }
}

#[test]
fn original_functions_still_work() {
    assert_eq!(mul(17, 13.5), 229.5);
    assert_eq!(minmax(vec![3, 1, 2]), (1, 3));
    assert_eq!(half(10), Ok(5));
    assert_eq!(Counter { base: 10 }.add(7), 17);
}

#[test]
fn adapter_applies_function_to_wire_args() {
    let remotable = mul_remotable();
    assert_eq!(remotable.name(), "mul");
    let values = remotable.apply(None, &[Value::Int(17), Value::Float(13.5)]).unwrap();
    assert_eq!(values, vec![Value::Float(229.5)]);
}

#[test]
fn tuple_adapter_splits_return_fields() {
    let remotable = minmax_remotable();
    let args = vec![Value::Array(vec![Value::Int(3), Value::Int(1), Value::Int(2)])];
    let values = remotable.apply(None, &args).unwrap();
    assert_eq!(values, vec![Value::Int(1), Value::Int(3)]);
}

#[test]
fn unit_adapter_returns_empty_sequence() {
    let remotable = touch_remotable();
    let values = remotable.apply(None, &[Value::from("x")]).unwrap();
    assert!(values.is_empty());
}

#[test]
fn typed_adapter_tags_the_error() {
    let remotable = half_remotable();
    let err = remotable.apply(None, &[Value::Int(-3)]).unwrap_err();
    let RemoteApplyError::Failed { type_name, message, exception_object } = err else {
        panic!("expected Failed");
    };
    assert_eq!(type_name, "NotPositive");
    assert_eq!(message, "n must be positive, got -3");
    assert_eq!(exception_object, Some(serde_json::json!({"got": -3})));
}

#[test]
fn method_adapter_uses_shipped_instance() {
    let remotable = counter_add_remotable();
    assert_eq!(remotable.name(), "Counter::add");

    let instance = encode_arg(&Counter { base: 10 }).unwrap();
    let values = remotable.apply(Some(&instance), &[Value::Int(7)]).unwrap();
    assert_eq!(values, vec![Value::Int(17)]);
}

#[test]
fn method_tuple_adapter() {
    let remotable = counter_bounds_remotable();
    let instance = encode_arg(&Counter { base: 10 }).unwrap();
    let values = remotable.apply(Some(&instance), &[Value::Int(2)]).unwrap();
    assert_eq!(values, vec![Value::Int(8), Value::Int(12)]);
}

#[test]
fn adapters_register_once() {
    let set = RemotableSet::new();
    set.insert(mul_remotable()).unwrap();
    set.insert(mul_remotable()).unwrap();
    set.insert(counter_add_remotable()).unwrap();
    assert_eq!(
        set.names(),
        vec!["Counter::add".to_string(), "mul".to_string()]
    );
}

#[test]
fn unpack_empty_is_unit() {
    unpack_return_values::<()>(&[]).unwrap();
}

#[test]
fn unpack_single_value() {
    let unpacked: f64 = unpack_return_values(&[Value::Float(229.5)]).unwrap();
    assert_eq!(unpacked, 229.5);
}

#[test]
fn unpack_single_collection_stays_whole() {
    let values = vec![Value::Array(vec![Value::Int(1), Value::Int(2)])];
    let unpacked: Vec<i64> = unpack_return_values(&values).unwrap();
    assert_eq!(unpacked, vec![1, 2]);
}

#[test]
fn unpack_many_values_as_tuple() {
    let values = vec![Value::Int(1), Value::Int(3)];
    let unpacked: (i64, i64) = unpack_return_values(&values).unwrap();
    assert_eq!(unpacked, (1, 3));
}

#[test]
fn roundtrip_matches_local_call() {
    // remote_f(x) must equal f(x): apply the adapter, unpack the sequence.
    let remotable = minmax_remotable();
    let args = vec![encode_arg(&vec![9i64, -4, 2]).unwrap()];
    let values = remotable.apply(None, &args).unwrap();
    let unpacked: (i64, i64) = unpack_return_values(&values).unwrap();
    assert_eq!(unpacked, minmax(vec![9, -4, 2]));
}

#[test]
fn unpack_mismatch_is_typed_error() {
    let err = unpack_return_values::<i64>(&[Value::from("nope")]).unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedResponse(_)));
}

#[test]
fn remote_target_from_address() {
    let target: RemoteTarget = "worker-3:5000".into();
    assert_eq!(target.address, "worker-3:5000");
    assert!(target.remote_timeout.is_none());

    let target = RemoteTarget::new("worker-3").with_timeout(Duration::from_secs(30));
    assert_eq!(target.remote_timeout, Some(Duration::from_secs(30)));
}
