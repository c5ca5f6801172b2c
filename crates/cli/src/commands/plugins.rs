// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin commands: list, reload.

use errand_client::{ClientError, RemoteServer};

pub fn list(server: &RemoteServer) -> Result<(), ClientError> {
    println!("Current Job Plugins:");
    for name in server.job_plugins()? {
        println!("  {name}");
    }
    Ok(())
}

pub fn reload(server: &RemoteServer) -> Result<(), ClientError> {
    server.reload()?;
    println!("Current Job Plugins:");
    for name in server.job_plugins()? {
        println!("  {name}");
    }
    Ok(())
}
