// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec harness: spawn a daemon, wait for it, clean up after.

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use errand_client::RemoteServer;

/// Upper bound for condition polling in specs.
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// A running `errandd` on an ephemeral port, killed on drop.
pub struct Daemon {
    child: Child,
    pub port: u16,
}

impl Daemon {
    pub fn start() -> Self {
        let port = free_port();
        let child = Command::new(assert_cmd::cargo::cargo_bin("errandd"))
            .args(["--port", &port.to_string()])
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .spawn()
            .expect("failed to spawn errandd");
        let daemon = Self { child, port };
        daemon
            .server()
            .wait_for_available(Duration::from_millis(50), 200)
            .expect("daemon did not come up");
        daemon
    }

    pub fn addr(&self) -> String {
        format!("localhost:{}", self.port)
    }

    pub fn server(&self) -> RemoteServer {
        RemoteServer::new(&self.addr()).expect("bad daemon address")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Poll `condition` every 20 ms for up to `max_ms`.
pub fn wait_for(max_ms: u64, condition: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_millis(max_ms);
    loop {
        if condition() {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("no free port");
    listener.local_addr().expect("no local addr").port()
}
