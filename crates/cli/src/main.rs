// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! errand: command-line client for the errand daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use errand_client::RemoteServer;

#[derive(Parser)]
#[command(name = "errand", about = "Client for the errand remote-execution daemon", version)]
struct Cli {
    /// The address of the errand daemon you want to target
    #[arg(short, long, default_value = "localhost")]
    address: String,

    /// The port the errand daemon is listening on
    #[arg(short, long, default_value_t = errand_client::DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all available job plugins
    List,

    /// Create a job (config can be a path to a JSON file, or inline JSON)
    Create {
        /// The namespaced name of the job plugin you want to run
        name: String,

        /// Path to a JSON file passed to the job as its configuration,
        /// or the configuration itself as a JSON literal
        config: String,

        /// Start the job after it is created
        #[arg(short, long)]
        start: bool,
    },

    /// Start a job
    Start {
        /// UUID of the job
        id: String,
    },

    /// Get information about a job
    Info {
        /// UUID of the job
        id: String,
    },

    /// Get a list of all running jobs
    Running,

    /// Rescan the daemon's plugin environment and reload all plugins
    Reload,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = run(&cli);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), errand_client::ClientError> {
    let server = RemoteServer::new(&format!("{}:{}", cli.address, cli.port))?;
    match &cli.command {
        Command::List => commands::plugins::list(&server),
        Command::Create { name, config, start } => {
            commands::job::create(&server, name, config, *start)
        }
        Command::Start { id } => commands::job::start(&server, id),
        Command::Info { id } => commands::job::info(&server, id),
        Command::Running => commands::job::running(&server),
        Command::Reload => commands::plugins::reload(&server),
    }
}
