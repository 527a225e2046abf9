//! The reservation store: an append-only, id-ordered log supporting
//! binary-search lookup, FIFO expiry sweep, and periodic compaction
//! (spec.md §4.3).

use crate::catalog::Catalog;
use crate::rng::RandomSource;
use crate::wire::COOKIE_SIZE;

/// First reservation id ever assigned.
pub const FIRST_RESERVATION_ID: u32 = 1_000_000;

/// A single reservation.
///
/// `PENDING` while [`Reservation::first_ticket_id`] is absent, `REDEEMED`
/// once it's set — redemption is permanent, so a redeemed reservation is
/// immortal regardless of `expiration_time`.
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    reservation_id: u32,
    event_id: u32,
    ticket_count: u16,
    cookie: [u8; COOKIE_SIZE],
    expiration_time: u64,
    first_ticket_id: Option<u64>,
    /// Set by the sweep the first time this reservation is found expired
    /// while still pending. Purely store-internal bookkeeping — it is not
    /// consulted by redemption, which re-derives expiry from
    /// `expiration_time` directly (see spec.md §9's open question about the
    /// `<` vs `<=` comparison divergence).
    expired: bool,
}

impl Reservation {
    /// Assigned reservation id.
    #[must_use]
    pub const fn reservation_id(&self) -> u32 {
        self.reservation_id
    }

    /// Event this reservation is against.
    #[must_use]
    pub const fn event_id(&self) -> u32 {
        self.event_id
    }

    /// Number of tickets held.
    #[must_use]
    pub const fn ticket_count(&self) -> u16 {
        self.ticket_count
    }

    /// The 48-byte cookie.
    #[must_use]
    pub const fn cookie(&self) -> &[u8; COOKIE_SIZE] {
        &self.cookie
    }

    /// Unix-seconds expiration.
    #[must_use]
    pub const fn expiration_time(&self) -> u64 {
        self.expiration_time
    }

    /// The first ticket id assigned on redemption, if any.
    #[must_use]
    pub const fn first_ticket_id(&self) -> Option<u64> {
        self.first_ticket_id
    }

    /// Whether this reservation has already been redeemed.
    #[must_use]
    pub const fn is_redeemed(&self) -> bool {
        self.first_ticket_id.is_some()
    }

    /// Mark this reservation REDEEMED, recording the first ticket id it was
    /// assigned. Permanent: callers must only do this once, on first
    /// successful `GET_TICKETS`.
    pub(crate) fn redeem(&mut self, first_ticket_id: u64) {
        self.first_ticket_id = Some(first_ticket_id);
    }
}

/// Append-only reservation log, ordered by ascending `reservation_id`.
#[derive(Debug)]
pub struct ReservationStore {
    reservations: Vec<Reservation>,
    /// Logical capacity we manage explicitly (doubling growth, quartering
    /// shrink), independent of `Vec`'s own amortized growth so the schedule
    /// in spec.md §4.3 is exactly reproducible.
    capacity: usize,
    next_id: u32,
    first_unexpired_index: usize,
    expired_pending_count: usize,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore {
    /// An empty store, first id [`FIRST_RESERVATION_ID`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reservations: Vec::new(),
            capacity: 0,
            next_id: FIRST_RESERVATION_ID,
            first_unexpired_index: 0,
            expired_pending_count: 0,
        }
    }

    /// Number of reservations currently stored (including expired-but-not
    /// yet compacted ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Whether the store holds no reservations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// The explicitly tracked capacity (see [`ReservationStore::capacity`]
    /// docs on the struct). Exposed for capacity-discipline tests.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Create a new reservation for `ticket_count` tickets against
    /// `event_id`, expiring `timeout` seconds after `now`.
    ///
    /// Does not touch the catalog — callers must have already checked
    /// availability and called [`Catalog::reserve`] themselves.
    pub fn create(
        &mut self,
        event_id: u32,
        ticket_count: u16,
        now: u64,
        timeout: u64,
        rng: &mut dyn RandomSource,
    ) -> Reservation {
        let reservation_id = self.next_id;
        self.next_id += 1;

        let reservation = Reservation {
            reservation_id,
            event_id,
            ticket_count,
            cookie: crate::cookie::generate(reservation_id, rng),
            expiration_time: now + timeout,
            first_ticket_id: None,
            expired: false,
        };

        self.push(reservation);
        reservation
    }

    /// Look up a reservation by id, requiring the presented cookie to
    /// match exactly.
    pub fn find(&mut self, reservation_id: u32, cookie: &[u8; COOKIE_SIZE]) -> Option<&mut Reservation> {
        let idx = self
            .reservations
            .binary_search_by_key(&reservation_id, Reservation::reservation_id)
            .ok()?;
        if &self.reservations[idx].cookie == cookie {
            Some(&mut self.reservations[idx])
        } else {
            None
        }
    }

    /// Run the expiry sweep: walk forward from the last known unexpired
    /// index, releasing tickets for pending reservations whose
    /// `expiration_time <= now`, stopping at the first reservation whose
    /// `expiration_time > now`. Insertion order matches expiration order
    /// because `timeout` is constant per server, so this is a single
    /// forward pass, never a full rescan.
    pub fn sweep(&mut self, now: u64, catalog: &mut Catalog) {
        while self.first_unexpired_index < self.reservations.len() {
            let reservation = &mut self.reservations[self.first_unexpired_index];
            if reservation.expiration_time > now {
                break;
            }
            if reservation.first_ticket_id.is_none() && !reservation.expired {
                catalog.release(reservation.event_id, reservation.ticket_count);
                reservation.expired = true;
                self.expired_pending_count += 1;
            }
            self.first_unexpired_index += 1;
        }

        if self.expired_pending_count * 2 >= self.reservations.len() {
            self.compact(now);
        }
    }

    /// Drop expired-and-not-redeemed reservations, preserving ascending-id
    /// order for everything retained, then shrink capacity geometrically.
    fn compact(&mut self, _now: u64) {
        self.reservations.retain(|r| r.is_redeemed() || !r.expired);

        self.first_unexpired_index = 0;
        self.expired_pending_count = 0;

        let size = self.reservations.len();
        while self.capacity / 4 > size {
            self.capacity /= 4;
        }
        self.reservations.shrink_to(self.capacity);
    }

    fn push(&mut self, reservation: Reservation) {
        if self.reservations.len() == self.capacity {
            let new_capacity = if self.capacity == 0 { 1 } else { self.capacity * 2 };
            self.reservations.reserve_exact(new_capacity - self.capacity);
            self.capacity = new_capacity;
        }
        self.reservations.push(reservation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Event};
    use crate::rng::Lcg;
    use bytes::Bytes;

    fn catalog_with_one_event(tickets: u16) -> Catalog {
        Catalog::new(vec![Event::new(Bytes::from_static(b"Concert"), tickets)])
    }

    #[test]
    fn ids_are_monotone_starting_at_one_million() {
        let mut store = ReservationStore::new();
        let mut catalog = catalog_with_one_event(10);
        let mut rng = Lcg::new(2137);

        let first = store.create(0, 1, 0, 5, &mut rng);
        catalog.reserve(0, 1);
        let second = store.create(0, 1, 0, 5, &mut rng);
        catalog.reserve(0, 1);

        assert_eq!(first.reservation_id(), FIRST_RESERVATION_ID);
        assert_eq!(second.reservation_id(), FIRST_RESERVATION_ID + 1);
    }

    #[test]
    fn find_requires_matching_cookie() {
        let mut store = ReservationStore::new();
        let mut rng = Lcg::new(2137);
        let reservation = store.create(0, 2, 0, 5, &mut rng);

        let wrong_cookie = [0u8; COOKIE_SIZE];
        assert!(store.find(reservation.reservation_id(), &wrong_cookie).is_none());
        assert!(store
            .find(reservation.reservation_id(), reservation.cookie())
            .is_some());
    }

    #[test]
    fn sweep_expires_pending_and_releases_tickets() {
        let mut store = ReservationStore::new();
        let mut catalog = catalog_with_one_event(2);
        let mut rng = Lcg::new(2137);

        catalog.reserve(0, 2);
        let reservation = store.create(0, 2, 0, 5, &mut rng);
        assert_eq!(catalog.available(0), 0);

        store.sweep(4, &mut catalog);
        assert_eq!(catalog.available(0), 0, "not yet expired at t=4");

        store.sweep(5, &mut catalog);
        assert_eq!(catalog.available(0), 2, "expired at t=5 (<=, not <)");

        // A lone reservation that just expired is 100% of the store, so the
        // same sweep's compaction threshold (expired >= total/2) fires
        // immediately and the record is gone; either way redemption must
        // now fail.
        assert!(store
            .find(reservation.reservation_id(), reservation.cookie())
            .is_none());
    }

    #[test]
    fn sweep_is_idempotent_at_fixed_now() {
        let mut store = ReservationStore::new();
        let mut catalog = catalog_with_one_event(2);
        let mut rng = Lcg::new(2137);

        catalog.reserve(0, 2);
        store.create(0, 2, 0, 5, &mut rng);

        store.sweep(10, &mut catalog);
        assert_eq!(catalog.available(0), 2);
        store.sweep(10, &mut catalog);
        assert_eq!(catalog.available(0), 2, "second sweep at same `now` is a no-op");
    }

    #[test]
    fn redeemed_reservations_survive_compaction() {
        let mut store = ReservationStore::new();
        let mut catalog = catalog_with_one_event(10);
        let mut rng = Lcg::new(2137);

        catalog.reserve(0, 1);
        let redeemed = store.create(0, 1, 0, 5, &mut rng);
        {
            let r = store
                .find(redeemed.reservation_id(), redeemed.cookie())
                .unwrap();
            let mut dummy = r.clone();
            dummy.first_ticket_id = Some(0);
            *r = dummy;
        }

        // Force enough expired-pending reservations to trigger compaction.
        for _ in 0..5 {
            catalog.reserve(0, 1);
            store.create(0, 1, 0, 0, &mut rng);
        }

        store.sweep(1000, &mut catalog);

        assert!(store
            .find(redeemed.reservation_id(), redeemed.cookie())
            .is_some());
        assert!(store.len() < 6, "expired entries should have been compacted away");
    }

    #[test]
    fn capacity_doubles_on_append() {
        let mut store = ReservationStore::new();
        let mut rng = Lcg::new(2137);
        assert_eq!(store.capacity(), 0);

        store.create(0, 1, 0, 5, &mut rng);
        assert_eq!(store.capacity(), 1);
        store.create(0, 1, 0, 5, &mut rng);
        assert_eq!(store.capacity(), 2);
        store.create(0, 1, 0, 5, &mut rng);
        assert_eq!(store.capacity(), 4);
        store.create(0, 1, 0, 5, &mut rng);
        assert_eq!(store.capacity(), 4);
        store.create(0, 1, 0, 5, &mut rng);
        assert_eq!(store.capacity(), 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Sweep monotonicity: running `sweep(now)` twice at the same
            /// `now` never changes `available_tickets` on the second call.
            #[test]
            fn sweep_is_idempotent_for_any_now(
                ticket_count in 1u16..100,
                timeout in 1u64..1000,
                now in 0u64..5000,
            ) {
                let mut store = ReservationStore::new();
                let mut catalog = catalog_with_one_event(ticket_count);
                let mut rng = Lcg::new(2137);

                catalog.reserve(0, ticket_count);
                store.create(0, ticket_count, 0, timeout, &mut rng);

                store.sweep(now, &mut catalog);
                let after_first = catalog.available(0);
                store.sweep(now, &mut catalog);
                prop_assert_eq!(catalog.available(0), after_first);
            }

            /// A freshly created reservation is always found by its own
            /// id and cookie, regardless of how many other reservations
            /// share the store.
            #[test]
            fn create_then_find_always_succeeds(
                prior_count in 0usize..20,
                ticket_count in 1u16..50,
            ) {
                let mut store = ReservationStore::new();
                let mut catalog = catalog_with_one_event(u16::MAX);
                let mut rng = Lcg::new(2137);

                for _ in 0..prior_count {
                    catalog.reserve(0, 1);
                    store.create(0, 1, 0, 5, &mut rng);
                }

                catalog.reserve(0, ticket_count);
                let reservation = store.create(0, ticket_count, 0, 5, &mut rng);
                let found = store.find(reservation.reservation_id(), reservation.cookie());
                prop_assert!(found.is_some());
                prop_assert_eq!(found.unwrap().ticket_count(), ticket_count);
            }

            /// Capacity discipline: appending `n` reservations one at a
            /// time never leaves `capacity` below the actual length, and
            /// capacity only ever grows by doubling.
            #[test]
            fn capacity_stays_at_least_length_and_doubles(n in 0usize..64) {
                let mut store = ReservationStore::new();
                let mut rng = Lcg::new(2137);
                let mut previous_capacity = 0usize;

                for _ in 0..n {
                    store.create(0, 1, 0, 5, &mut rng);
                    prop_assert!(store.capacity() >= store.len());
                    if store.capacity() != previous_capacity {
                        prop_assert_eq!(store.capacity(), (previous_capacity * 2).max(1));
                    }
                    previous_capacity = store.capacity();
                }
            }
        }
    }
}
