//! Server -> client response encoding.

use super::{COOKIE_SIZE, MAX_DATAGRAM_SIZE, response_opcode};

/// One event's entry inside an `EVENTS` response body.
#[derive(Debug, Clone, Copy)]
pub struct EventEntry<'a> {
    /// 0-based event id.
    pub event_id: u32,
    /// Tickets currently available.
    pub available: u16,
    /// Raw description bytes (1..=255 long).
    pub description: &'a [u8],
}

/// A response ready to be serialized onto the wire.
#[derive(Debug, Clone)]
pub enum Response<'a> {
    /// `EVENTS` — the full catalog in load order.
    Events(Vec<EventEntry<'a>>),

    /// `RESERVATION` — a freshly created reservation.
    Reservation {
        /// Assigned reservation id.
        reservation_id: u32,
        /// Event the reservation is against.
        event_id: u32,
        /// Number of tickets held.
        ticket_count: u16,
        /// Generated cookie.
        cookie: [u8; COOKIE_SIZE],
        /// Unix-seconds expiration.
        expiration_time: u64,
    },

    /// `TICKETS` — redeemed ticket identifiers.
    Tickets {
        /// Reservation that was redeemed.
        reservation_id: u32,
        /// 7-byte base-36 ticket ids, in order.
        ticket_ids: Vec<[u8; 7]>,
    },

    /// `BAD_REQUEST` — echoes back the id field of the failing request.
    BadRequest {
        /// `event_id` for a failed `GET_RESERVATION`, `reservation_id` for a
        /// failed `GET_TICKETS`.
        echoed_id: u32,
    },
}

impl<'a> Response<'a> {
    /// Serialize this response to bytes.
    ///
    /// # Panics
    ///
    /// Panics if the encoded body would exceed [`MAX_DATAGRAM_SIZE`]. Both
    /// producers of variable-length responses (the loader, for `Events`;
    /// the dispatcher's pre-check, for `Tickets`) are required to guarantee
    /// this bound holds before constructing the response, so hitting this
    /// panic indicates a bug upstream, not a reachable client input.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let bytes = match self {
            Self::Events(entries) => Self::encode_events(entries),
            Self::Reservation {
                reservation_id,
                event_id,
                ticket_count,
                cookie,
                expiration_time,
            } => Self::encode_reservation(
                *reservation_id,
                *event_id,
                *ticket_count,
                cookie,
                *expiration_time,
            ),
            Self::Tickets {
                reservation_id,
                ticket_ids,
            } => Self::encode_tickets(*reservation_id, ticket_ids),
            Self::BadRequest { echoed_id } => Self::encode_bad_request(*echoed_id),
        };

        assert!(
            bytes.len() <= MAX_DATAGRAM_SIZE,
            "response exceeds MAX_DATAGRAM_SIZE: {} > {MAX_DATAGRAM_SIZE}",
            bytes.len()
        );

        bytes
    }

    fn encode_events(entries: &[EventEntry<'_>]) -> Vec<u8> {
        let mut bytes = vec![response_opcode::EVENTS];
        for entry in entries {
            bytes.extend_from_slice(&entry.event_id.to_be_bytes());
            bytes.extend_from_slice(&entry.available.to_be_bytes());
            let desc_len = u8::try_from(entry.description.len())
                .expect("event description length fits in u8 (validated at load)");
            bytes.push(desc_len);
            bytes.extend_from_slice(entry.description);
        }
        bytes
    }

    fn encode_reservation(
        reservation_id: u32,
        event_id: u32,
        ticket_count: u16,
        cookie: &[u8; COOKIE_SIZE],
        expiration_time: u64,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 4 + 4 + 2 + COOKIE_SIZE + 8);
        bytes.push(response_opcode::RESERVATION);
        bytes.extend_from_slice(&reservation_id.to_be_bytes());
        bytes.extend_from_slice(&event_id.to_be_bytes());
        bytes.extend_from_slice(&ticket_count.to_be_bytes());
        bytes.extend_from_slice(cookie);
        bytes.extend_from_slice(&expiration_time.to_be_bytes());
        bytes
    }

    fn encode_tickets(reservation_id: u32, ticket_ids: &[[u8; 7]]) -> Vec<u8> {
        let ticket_count = u16::try_from(ticket_ids.len())
            .expect("ticket_count was validated against MAX_DATAGRAM_SIZE before redemption");
        let mut bytes = Vec::with_capacity(1 + 4 + 2 + ticket_ids.len() * 7);
        bytes.push(response_opcode::TICKETS);
        bytes.extend_from_slice(&reservation_id.to_be_bytes());
        bytes.extend_from_slice(&ticket_count.to_be_bytes());
        for id in ticket_ids {
            bytes.extend_from_slice(id);
        }
        bytes
    }

    fn encode_bad_request(echoed_id: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(5);
        bytes.push(response_opcode::BAD_REQUEST);
        bytes.extend_from_slice(&echoed_id.to_be_bytes());
        bytes
    }
}

/// Given a running prefix-sum budget, returns whether adding one more event
/// entry of `desc_len` bytes keeps the `EVENTS` response within
/// [`MAX_DATAGRAM_SIZE`]. Shared by the loader (truncating the event list)
/// and tests asserting the same bound.
#[must_use]
pub fn events_entry_fits(prefix_sum: usize, desc_len: usize) -> bool {
    prefix_sum + 7 + desc_len <= MAX_DATAGRAM_SIZE
}

/// Whether a `GET_RESERVATION` for `ticket_count` tickets could ever be
/// redeemed without its `TICKETS` response exceeding [`MAX_DATAGRAM_SIZE`].
#[must_use]
pub fn tickets_response_fits(ticket_count: u16) -> bool {
    (usize::from(ticket_count) + 1) * 7 <= MAX_DATAGRAM_SIZE
}
