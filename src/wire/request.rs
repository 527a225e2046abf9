//! Client -> server request decoding.

use super::{COOKIE_SIZE, opcode};

/// A decoded, length-validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `GET_EVENTS` — opcode only, no body.
    GetEvents,

    /// `GET_RESERVATION` — request `ticket_count` tickets for `event_id`.
    GetReservation {
        /// Target event.
        event_id: u32,
        /// Number of tickets requested.
        ticket_count: u16,
    },

    /// `GET_TICKETS` — redeem (or re-redeem) a reservation.
    GetTickets {
        /// Reservation to redeem.
        reservation_id: u32,
        /// Cookie presented by the client.
        cookie: [u8; COOKIE_SIZE],
    },
}

impl Request {
    /// Decode one datagram into a request.
    ///
    /// Returns `None` when the opcode is unknown, the buffer is empty, or
    /// the buffer length doesn't exactly match what the opcode requires —
    /// all three are silent protocol drops per the wire contract, not
    /// errors worth surfacing to the caller.
    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let opcode = *buf.first()?;
        match (opcode, buf.len()) {
            (opcode::GET_EVENTS, 1) => Some(Self::GetEvents),
            (opcode::GET_RESERVATION, 7) => {
                let event_id = u32::from_be_bytes(buf[1..5].try_into().unwrap());
                let ticket_count = u16::from_be_bytes(buf[5..7].try_into().unwrap());
                Some(Self::GetReservation {
                    event_id,
                    ticket_count,
                })
            }
            (opcode::GET_TICKETS, 53) => {
                let reservation_id = u32::from_be_bytes(buf[1..5].try_into().unwrap());
                let mut cookie = [0u8; COOKIE_SIZE];
                cookie.copy_from_slice(&buf[5..53]);
                Some(Self::GetTickets {
                    reservation_id,
                    cookie,
                })
            }
            _ => None,
        }
    }
}
