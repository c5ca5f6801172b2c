// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! errandd: the errand daemon binary.
//!
//! Serves the HTTP surface on `--port` (default 5000). The hidden `worker`
//! subcommand is the entry point for the per-job processes the daemon
//! spawns; it is not part of the public surface.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use errand_client::RemotableSet;
use errand_daemon::http::{router, AppState};
use errand_daemon::manager::JobManager;
use errand_daemon::registry::{PluginRegistry, PluginSet};
use errand_daemon::supervisor::ProcessSpawner;
use errand_daemon::worker::{self, WorkerArgs};

const DEFAULT_PORT: u16 = 5000;

#[derive(Parser)]
#[command(name = "errandd", about = "Errand remote-execution daemon", version)]
struct Cli {
    /// The port number to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Start the server in debug mode (verbose logging)
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Internal worker entry point; spawned by the daemon, not for direct use
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        plugin: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        port: u16,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Some(Command::Worker { plugin, id, token, port }) => {
            let registry = default_registry();
            let args = WorkerArgs {
                plugin,
                id: id.into(),
                token: token.into(),
                server_port: port,
            };
            match u8::try_from(worker::run(&args, &registry)) {
                Ok(code) => ExitCode::from(code),
                Err(_) => ExitCode::FAILURE,
            }
        }
        None => serve(cli.port),
    }
}

/// Logs go to stderr: a worker's stdout is its failure pipe.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// The registry this binary carries: the remotify system plugins, plus the
/// exerciser set when built for the integration specs.
fn default_registry() -> Arc<PluginRegistry> {
    let remotables = Arc::new(RemotableSet::new());
    let extra: Vec<Arc<dyn PluginSet>> = Vec::new();

    #[cfg(feature = "test-plugins")]
    let extra = {
        use errand_daemon::plugins::test_plugins;
        test_plugins::register_test_remotables(&remotables);
        let mut extra = extra;
        extra.push(test_plugins::test_plugin_set());
        extra
    };

    Arc::new(PluginRegistry::builtin(remotables, extra))
}

fn serve(port: u16) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let registry = default_registry();
        let manager =
            Arc::new(JobManager::new(Arc::clone(&registry), Arc::new(ProcessSpawner), port));
        let app = router(AppState { manager, registry });

        let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(port, error = %e, "failed to bind");
                return ExitCode::FAILURE;
            }
        };
        tracing::info!(port, "errand daemon listening");

        match axum::serve(listener, app).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server error");
                ExitCode::FAILURE
            }
        }
    })
}
