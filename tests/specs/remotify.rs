// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remotify specs: a remotified call behaves like the local call.

use std::time::Duration;

use crate::prelude::Daemon;
use errand_client::{RemoteCallError, RemoteTarget};
use errand_daemon::plugins::test_plugins::{
    fail_if_negative, minmax, mul_values, remote_async_minmax, remote_fail_if_negative,
    remote_minmax, remote_mul_values, NegativeInput,
};

#[test]
fn remote_call_matches_local_call() {
    let daemon = Daemon::start();
    let local = mul_values(17, 13.5);
    let remote = remote_mul_values(daemon.addr(), 17, 13.5).unwrap();
    assert_eq!(remote, local);
}

#[test]
fn tuple_returns_stay_tuples() {
    let daemon = Daemon::start();
    let values = vec![9i64, -4, 2];
    let local = minmax(values.clone());
    let remote = remote_minmax(daemon.addr(), values).unwrap();
    assert_eq!(remote, local);
    assert_eq!(remote, (-4, 9));
}

#[test]
fn async_handle_exposes_the_job_interface() {
    let daemon = Daemon::start();
    let mut call = remote_async_minmax(daemon.addr(), vec![5i64, 3]).unwrap();

    // Not started yet: nothing runs until start.
    assert!(!call.running(true).unwrap());
    assert!(call.start().unwrap());

    let value = call.join(Some(Duration::from_secs(10))).unwrap();
    assert_eq!(value, (3, 5));
    assert!(call.finished(true).unwrap());
}

#[test]
fn typed_error_is_reconstructed() {
    let daemon = Daemon::start();
    let err = remote_fail_if_negative(daemon.addr(), -2).unwrap_err();
    match err {
        RemoteCallError::Remote(original) => {
            assert_eq!(original, NegativeInput { got: -2 });
        }
        RemoteCallError::Framework(other) => panic!("expected reconstruction, got {other}"),
    }

    // The happy path still matches the local call.
    assert_eq!(
        remote_fail_if_negative(daemon.addr(), 3).unwrap(),
        fail_if_negative(3).unwrap()
    );
}

#[test]
fn remote_timeout_is_honored() {
    let daemon = Daemon::start();
    let target = RemoteTarget::new(daemon.addr()).with_timeout(Duration::from_secs(20));
    assert_eq!(remote_mul_values(target, 2, 2.0).unwrap(), 4.0);
}
