//! Startup-time error taxonomy.
//!
//! Protocol-level failures (`ProtocolReject`, `ProtocolDrop` in spec terms)
//! never reach this type — they're represented directly as
//! [`crate::wire::Response::BadRequest`] values or silent drops. This error
//! only covers what spec.md calls StartupFatal: bad arguments, an unreadable
//! or malformed events file, or a socket that refuses to bind.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The events file could not be opened or read.
    #[error("failed to read events file {path:?}: {source}")]
    EventsFileIo {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The events file ended mid-pair (a description with no matching
    /// ticket-count line).
    #[error("events file {path:?} ends mid-record (dangling description line)")]
    TruncatedRecord {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The events file contained no description/ticket-count pairs at all.
    #[error("events file {path:?} is empty")]
    EmptyEventsFile {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// A description line was empty or longer than 255 bytes.
    #[error("events file {path:?}: description on line {line} has invalid length {len} (must be 1..=255)")]
    InvalidDescriptionLength {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number of the offending description.
        line: usize,
        /// Length that failed validation.
        len: usize,
    },

    /// A ticket-count line failed to parse as `u16`.
    #[error("events file {path:?}: ticket count on line {line} is not a valid integer in 0..=65535: {value:?}")]
    InvalidTicketCount {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number of the offending count.
        line: usize,
        /// Raw text that failed to parse.
        value: String,
    },

    /// Could not bind the UDP socket.
    #[error("failed to bind UDP socket on port {port}: {source}")]
    SocketBind {
        /// Requested port.
        port: u16,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
