// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-cli: Command line front end for the pulse real-time client.
//!
//! The `pulse` binary derives socket endpoints, streams events as JSON lines
//! and checks round trips against a backend. Logs go to stderr so stdout
//! stays machine-readable.

mod cli;
mod commands;
pub mod error;

pub use cli::{Cli, Command, GlobalArgs};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Install the global log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `info`, or `debug` with `--verbose`.
pub fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute a CLI command.
pub async fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Command::Url { user } => commands::url::run(&global, &user),
        Command::Listen {
            user,
            kinds,
            ping_interval,
        } => commands::listen::run(&global, &user, &kinds, ping_interval).await,
        Command::Ping { user, timeout } => commands::ping::run(&global, &user, timeout).await,
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
