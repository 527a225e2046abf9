//! A connectionless UDP ticket-reservation server.
//!
//! Clients discover a catalog of events, request time-limited reservations
//! against an event's ticket pool, and later redeem a reservation to obtain
//! opaque ticket identifiers. All communication is a custom binary datagram
//! protocol over UDP; see [`wire`] for the exact framing.
//!
//! The server is strictly single-threaded: one datagram is fully handled —
//! sweep, decode, dispatch, encode — before the next is read. There is no
//! persistence, no encryption, and no authentication beyond the cookie
//! issued with each reservation.
//!
//! # Quick start
//!
//! ```no_run
//! use ticket_server::{dispatcher::Dispatcher, env::SystemEnv, loader, socket::UdpEndpoint, wire::MAX_DATAGRAM_SIZE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = loader::load_events(std::path::Path::new("events.txt"))?;
//! let mut dispatcher = Dispatcher::new(catalog, 5);
//! let endpoint = UdpEndpoint::bind(2022)?;
//! let mut env = SystemEnv::new();
//!
//! let mut buf = [0u8; MAX_DATAGRAM_SIZE];
//! loop {
//!     let (len, from) = endpoint.recv_from(&mut buf)?;
//!     if let Some(response) = dispatcher.run_once(&buf[..len], &mut env) {
//!         endpoint.send_to(&response, from)?;
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod cli;
pub mod cookie;
pub mod dispatcher;
pub mod env;
pub mod error;
pub mod loader;
pub mod rng;
pub mod socket;
pub mod store;
pub mod ticket_id;
pub mod wire;

pub use catalog::Catalog;
pub use dispatcher::Dispatcher;
pub use env::{Environment, SystemEnv};
pub use error::StartupError;
pub use store::ReservationStore;
