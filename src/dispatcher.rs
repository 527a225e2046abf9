//! The request dispatcher: owns the catalog, the reservation store, and the
//! ticket issuer, and drives them from one decoded datagram at a time
//! (spec.md §4.4).
//!
//! Deliberately socket-free — [`Dispatcher::run_once`] takes a raw buffer
//! and returns an optional response buffer, so the whole state machine is
//! testable without a real `UdpSocket`.

use crate::catalog::Catalog;
use crate::env::Environment;
use crate::store::ReservationStore;
use crate::ticket_id::{self, TicketIssuer};
use crate::wire::{Request, Response, tickets_response_fits};

/// Owns all mutable server state and dispatches one datagram at a time.
pub struct Dispatcher {
    catalog: Catalog,
    store: ReservationStore,
    issuer: TicketIssuer,
    timeout: u64,
}

impl Dispatcher {
    /// Build a dispatcher over an already-loaded catalog, with reservations
    /// expiring `timeout` seconds after creation.
    #[must_use]
    pub fn new(catalog: Catalog, timeout: u64) -> Self {
        Self {
            catalog,
            store: ReservationStore::new(),
            issuer: TicketIssuer::new(),
            timeout,
        }
    }

    /// Number of events in the catalog. Exposed for startup logging.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.catalog.len()
    }

    /// Process one datagram: sweep expiries, decode, dispatch, encode.
    ///
    /// Returns `None` for a silent protocol drop (malformed datagram);
    /// `Some(bytes)` for every other outcome, including `BAD_REQUEST`.
    pub fn run_once(&mut self, datagram: &[u8], env: &mut dyn Environment) -> Option<Vec<u8>> {
        let now = env.now();
        self.store.sweep(now, &mut self.catalog);

        let request = Request::decode(datagram);
        let Some(request) = request else {
            tracing::trace!(len = datagram.len(), "dropping malformed datagram");
            return None;
        };

        let response = match request {
            Request::GetEvents => self.handle_get_events(),
            Request::GetReservation {
                event_id,
                ticket_count,
            } => self.handle_get_reservation(event_id, ticket_count, now, env),
            Request::GetTickets {
                reservation_id,
                cookie,
            } => self.handle_get_tickets(reservation_id, &cookie, now),
        };

        Some(response.encode())
    }

    fn handle_get_events(&self) -> Response<'_> {
        Response::Events(self.catalog.enumerate().collect())
    }

    fn handle_get_reservation(
        &mut self,
        event_id: u32,
        ticket_count: u16,
        now: u64,
        env: &mut dyn Environment,
    ) -> Response<'static> {
        if !tickets_response_fits(ticket_count) {
            tracing::debug!(
                event_id,
                ticket_count,
                "get_reservation rejected: redemption would exceed MAX_DATAGRAM_SIZE"
            );
            return Response::BadRequest { echoed_id: event_id };
        }

        if !self.catalog.exists(event_id) || ticket_count == 0 {
            tracing::debug!(event_id, ticket_count, "get_reservation rejected: bad event or count");
            return Response::BadRequest { echoed_id: event_id };
        }

        if self.catalog.available(event_id) < ticket_count {
            tracing::debug!(event_id, ticket_count, "get_reservation rejected: insufficient tickets");
            return Response::BadRequest { echoed_id: event_id };
        }

        self.catalog.reserve(event_id, ticket_count);
        let reservation = self.store.create(event_id, ticket_count, now, self.timeout, env.rng());

        tracing::debug!(
            reservation_id = reservation.reservation_id(),
            event_id,
            ticket_count,
            "reservation created"
        );

        Response::Reservation {
            reservation_id: reservation.reservation_id(),
            event_id,
            ticket_count,
            cookie: *reservation.cookie(),
            expiration_time: reservation.expiration_time(),
        }
    }

    fn handle_get_tickets(&mut self, reservation_id: u32, cookie: &[u8; 48], now: u64) -> Response<'static> {
        let Some(reservation) = self.store.find(reservation_id, cookie) else {
            tracing::debug!(reservation_id, "get_tickets rejected: no matching reservation");
            return Response::BadRequest { echoed_id: reservation_id };
        };

        // Strict `<`, not the sweep's `<=` — see spec.md §9's open question on
        // the two comparisons diverging at `expiration_time == now`. Already
        // redeemed reservations never hit this branch: `first_ticket_id` is
        // `Some`, so this check is skipped and redemption is idempotent.
        if reservation.first_ticket_id().is_none() && reservation.expiration_time() < now {
            tracing::debug!(reservation_id, "get_tickets rejected: expired");
            return Response::BadRequest { echoed_id: reservation_id };
        }

        let ticket_count = reservation.ticket_count();
        let first_ticket_id = match reservation.first_ticket_id() {
            Some(first) => first,
            None => {
                let first = self.issuer.peek_next();
                self.issuer.allocate(ticket_count);
                reservation.redeem(first);
                tracing::debug!(reservation_id, first_ticket_id = first, ticket_count, "reservation redeemed");
                first
            }
        };

        let ticket_ids = (0..u64::from(ticket_count))
            .map(|offset| ticket_id::encode(first_ticket_id + offset))
            .collect();

        Response::Tickets {
            reservation_id,
            ticket_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Event;
    use crate::env::FixedEnv;
    use bytes::Bytes;

    fn dispatcher_with_events() -> Dispatcher {
        let catalog = Catalog::new(vec![
            Event::new(Bytes::from_static(b"Concert"), 2),
            Event::new(Bytes::from_static(b"Movie"), 0),
        ]);
        Dispatcher::new(catalog, 5)
    }

    fn get_events() -> Vec<u8> {
        vec![crate::wire::opcode::GET_EVENTS]
    }

    fn get_reservation(event_id: u32, ticket_count: u16) -> Vec<u8> {
        let mut buf = vec![crate::wire::opcode::GET_RESERVATION];
        buf.extend_from_slice(&event_id.to_be_bytes());
        buf.extend_from_slice(&ticket_count.to_be_bytes());
        buf
    }

    fn get_tickets(reservation_id: u32, cookie: &[u8; 48]) -> Vec<u8> {
        let mut buf = vec![crate::wire::opcode::GET_TICKETS];
        buf.extend_from_slice(&reservation_id.to_be_bytes());
        buf.extend_from_slice(cookie);
        buf
    }

    fn cookie_from_reservation_response(bytes: &[u8]) -> [u8; 48] {
        let mut cookie = [0u8; 48];
        cookie.copy_from_slice(&bytes[9..9 + 48]);
        cookie
    }

    #[test]
    fn malformed_datagram_is_dropped() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);
        assert!(dispatcher.run_once(&[200, 1, 2], &mut env).is_none());
    }

    #[test]
    fn scenario_1_events_listing() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);
        let response = dispatcher.run_once(&get_events(), &mut env).unwrap();

        assert_eq!(response[0], crate::wire::response_opcode::EVENTS);
        assert_eq!(u32::from_be_bytes(response[1..5].try_into().unwrap()), 0);
        assert_eq!(u16::from_be_bytes(response[5..7].try_into().unwrap()), 2);
        assert_eq!(&response[8..15], b"Concert");
    }

    #[test]
    fn scenario_2_and_3_reservation_then_exhausted_retry() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(1000, 2137);

        let response = dispatcher.run_once(&get_reservation(0, 2), &mut env).unwrap();
        assert_eq!(response[0], crate::wire::response_opcode::RESERVATION);
        let reservation_id = u32::from_be_bytes(response[1..5].try_into().unwrap());
        assert_eq!(reservation_id, 1_000_000);
        let expiration = u64::from_be_bytes(response[response.len() - 8..].try_into().unwrap());
        assert_eq!(expiration, 1005);

        let retry = dispatcher.run_once(&get_reservation(0, 1), &mut env).unwrap();
        assert_eq!(retry[0], crate::wire::response_opcode::BAD_REQUEST);
        assert_eq!(u32::from_be_bytes(retry[1..5].try_into().unwrap()), 0);
    }

    #[test]
    fn scenario_4_expiry_before_redemption() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(1000, 2137);

        let reservation_response = dispatcher.run_once(&get_reservation(0, 2), &mut env).unwrap();
        let cookie = cookie_from_reservation_response(&reservation_response);

        env.set_now(1006);
        let response = dispatcher
            .run_once(&get_tickets(1_000_000, &cookie), &mut env)
            .unwrap();

        assert_eq!(response[0], crate::wire::response_opcode::BAD_REQUEST);
        assert_eq!(u32::from_be_bytes(response[1..5].try_into().unwrap()), 1_000_000);

        let events = dispatcher.run_once(&get_events(), &mut env).unwrap();
        assert_eq!(u16::from_be_bytes(events[5..7].try_into().unwrap()), 2, "tickets returned");
    }

    #[test]
    fn scenario_5_redemption_is_idempotent() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(1000, 2137);

        let reservation_response = dispatcher.run_once(&get_reservation(0, 2), &mut env).unwrap();
        let cookie = cookie_from_reservation_response(&reservation_response);

        env.set_now(1001);
        let first = dispatcher
            .run_once(&get_tickets(1_000_000, &cookie), &mut env)
            .unwrap();
        assert_eq!(first[0], crate::wire::response_opcode::TICKETS);
        assert_eq!(u16::from_be_bytes(first[5..7].try_into().unwrap()), 2);
        assert_eq!(&first[7..14], b"0000000");
        assert_eq!(&first[14..21], b"1000000");

        env.set_now(1004);
        let second = dispatcher
            .run_once(&get_tickets(1_000_000, &cookie), &mut env)
            .unwrap();
        assert_eq!(first, second, "idempotent redemption is byte-identical");
    }

    #[test]
    fn scenario_6_nonexistent_event_is_rejected() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);

        let zero_available = dispatcher.run_once(&get_reservation(1, 1), &mut env).unwrap();
        assert_eq!(zero_available[0], crate::wire::response_opcode::BAD_REQUEST);
        assert_eq!(u32::from_be_bytes(zero_available[1..5].try_into().unwrap()), 1);

        let nonexistent = dispatcher.run_once(&get_reservation(5, 1), &mut env).unwrap();
        assert_eq!(nonexistent[0], crate::wire::response_opcode::BAD_REQUEST);
        assert_eq!(u32::from_be_bytes(nonexistent[1..5].try_into().unwrap()), 5);
    }

    #[test]
    fn zero_ticket_count_is_rejected() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);
        let response = dispatcher.run_once(&get_reservation(0, 0), &mut env).unwrap();
        assert_eq!(response[0], crate::wire::response_opcode::BAD_REQUEST);
    }

    #[test]
    fn oversized_ticket_count_is_rejected_without_touching_catalog() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);
        let response = dispatcher.run_once(&get_reservation(0, 9358), &mut env).unwrap();
        assert_eq!(response[0], crate::wire::response_opcode::BAD_REQUEST);

        let events = dispatcher.run_once(&get_events(), &mut env).unwrap();
        assert_eq!(u16::from_be_bytes(events[5..7].try_into().unwrap()), 2, "catalog untouched");
    }

    #[test]
    fn wrong_cookie_is_rejected() {
        let mut dispatcher = dispatcher_with_events();
        let mut env = FixedEnv::new(0, 2137);

        let reservation_response = dispatcher.run_once(&get_reservation(0, 1), &mut env).unwrap();
        let mut cookie = cookie_from_reservation_response(&reservation_response);
        cookie[47] ^= 0xFF;

        let response = dispatcher
            .run_once(&get_tickets(1_000_000, &cookie), &mut env)
            .unwrap();
        assert_eq!(response[0], crate::wire::response_opcode::BAD_REQUEST);
    }
}
