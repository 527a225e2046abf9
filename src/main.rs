//! Ticket server binary.
//!
//! # Usage
//!
//! ```bash
//! ticket-server --events-file events.txt --port 2022 --timeout 5
//! ```

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ticket_server::cli::Args;
use ticket_server::dispatcher::Dispatcher;
use ticket_server::env::SystemEnv;
use ticket_server::loader;
use ticket_server::socket::UdpEndpoint;
use ticket_server::wire::MAX_DATAGRAM_SIZE;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    if let Err(err) = run(&args) {
        tracing::error!(error = %err, "server exiting");
        eprintln!("ticket-server: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ticket_server::StartupError> {
    tracing::info!(path = %args.events_file.display(), "loading events");
    let catalog = loader::load_events(&args.events_file)?;
    tracing::info!(events = catalog.len(), "catalog loaded");

    let mut dispatcher = Dispatcher::new(catalog, args.timeout);
    let endpoint = UdpEndpoint::bind(args.port)?;
    let mut env = SystemEnv::new();

    tracing::info!(port = args.port, timeout = args.timeout, "listening");

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, from) = match endpoint.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "recv_from failed, continuing");
                continue;
            }
        };

        if let Some(response) = dispatcher.run_once(&buf[..len], &mut env) {
            if let Err(err) = endpoint.send_to(&response, from) {
                tracing::error!(error = %err, %from, "send_to failed, continuing");
            }
        }
    }
}
