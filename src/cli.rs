//! Command-line argument parsing (spec.md §6).

use std::path::PathBuf;

use clap::Parser;

/// Connectionless UDP ticket-reservation server.
#[derive(Parser, Debug)]
#[command(name = "ticket-server")]
#[command(about = "Connectionless UDP ticket-reservation server")]
#[command(version)]
pub struct Args {
    /// Path to the events file (alternating description / ticket-count lines).
    #[arg(short = 'f', long = "events-file")]
    pub events_file: PathBuf,

    /// UDP port to bind on.
    #[arg(short = 'p', long = "port", default_value_t = 2022)]
    pub port: u16,

    /// Reservation lifetime in seconds, 1..=86400.
    #[arg(short = 't', long = "timeout", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub timeout: u64,

    /// Log level passed to `tracing_subscriber`'s `EnvFilter` when
    /// `RUST_LOG` isn't set (trace, debug, info, warn, error).
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}
