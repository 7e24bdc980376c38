// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const QUICKSTART_HELP: &str = "\
Get started:
  export PULSE_API_URL=http://localhost:8000
  pulse url --user user-1             Show the socket endpoint
  pulse listen --user user-1          Stream every event as JSON lines
  pulse ping --user user-1            Check the round trip";

#[derive(Parser)]
#[command(name = "pulse")]
#[command(version)]
#[command(about = "Real-time event client: connect, subscribe and stream backend events")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (TOML) [env: PULSE_CONFIG]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides config and PULSE_API_URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the socket URL for a user
    #[command(after_help = "Examples:\n  \
        pulse url --user user-1\n  \
        pulse url --user user-1 --api-url https://api.example.com")]
    Url {
        /// User identity
        #[arg(long, short)]
        user: String,
    },

    /// Connect and print incoming events as JSON lines
    #[command(after_help = "Examples:\n  \
        pulse listen --user user-1                          All events\n  \
        pulse listen --user user-1 --kind notification      Only notifications\n  \
        pulse listen --user user-1 -k activity -k task_update\n  \
        pulse listen --user user-1 --ping-interval 30       Keep-alive pings")]
    Listen {
        /// User identity
        #[arg(long, short)]
        user: String,

        /// Event kind to print (repeatable, `*` for all) [default: *]
        #[arg(long = "kind", short = 'k', value_name = "KIND")]
        kinds: Vec<String>,

        /// Send a ping every N seconds
        #[arg(long, value_name = "SECS")]
        ping_interval: Option<u64>,
    },

    /// Connect, send a ping and print the pong
    Ping {
        /// User identity
        #[arg(long, short)]
        user: String,

        /// Seconds to wait for the pong
        #[arg(long, default_value = "10", value_name = "SECS")]
        timeout: u64,
    },
}
