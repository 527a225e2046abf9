//! The event catalog: an immutable ordered list of events, except for each
//! event's `available_tickets` counter.

use bytes::Bytes;

use crate::wire::response::EventEntry;

/// One event as loaded from the events file.
#[derive(Debug, Clone)]
pub struct Event {
    description: Bytes,
    initial_tickets: u16,
    available_tickets: u16,
}

impl Event {
    /// Construct an event with `available_tickets` starting at
    /// `initial_tickets`.
    #[must_use]
    pub fn new(description: Bytes, initial_tickets: u16) -> Self {
        Self {
            description,
            initial_tickets,
            available_tickets: initial_tickets,
        }
    }

    /// Raw description bytes (1..=255 long, not null-terminated).
    #[must_use]
    pub fn description(&self) -> &[u8] {
        &self.description
    }

    /// Tickets the event started with.
    #[must_use]
    pub const fn initial_tickets(&self) -> u16 {
        self.initial_tickets
    }

    /// Tickets currently available.
    #[must_use]
    pub const fn available_tickets(&self) -> u16 {
        self.available_tickets
    }
}

/// Ordered, load-order-indexed collection of events.
///
/// Immutable after construction except for each event's
/// `available_tickets`, which the reservation store mutates through
/// [`Catalog::reserve`] and [`Catalog::release`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    /// Build a catalog from an already-loaded, already-truncated event list.
    #[must_use]
    pub const fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Number of events in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events in load order as wire-ready entries.
    pub fn enumerate(&self) -> impl Iterator<Item = EventEntry<'_>> {
        self.events.iter().enumerate().map(|(idx, event)| EventEntry {
            event_id: idx as u32,
            available: event.available_tickets(),
            description: event.description(),
        })
    }

    /// Whether `event_id` names an existing event.
    #[must_use]
    pub fn exists(&self, event_id: u32) -> bool {
        self.index_of(event_id).is_some()
    }

    /// Tickets available for `event_id`; `0` if the event doesn't exist.
    #[must_use]
    pub fn available(&self, event_id: u32) -> u16 {
        self.index_of(event_id)
            .map_or(0, |idx| self.events[idx].available_tickets)
    }

    /// Decrement `event_id`'s available count by `n`.
    ///
    /// # Panics
    ///
    /// Panics if `event_id` doesn't exist or `n > available(event_id)` —
    /// callers (the dispatcher) must check both with [`Catalog::exists`]
    /// and [`Catalog::available`] before calling this.
    pub fn reserve(&mut self, event_id: u32, n: u16) {
        let idx = self
            .index_of(event_id)
            .expect("reserve called with nonexistent event_id");
        let event = &mut self.events[idx];
        assert!(
            n <= event.available_tickets,
            "reserve called with n > available_tickets"
        );
        event.available_tickets -= n;
    }

    /// Return `n` tickets to `event_id`'s pool. Unconditional: used only by
    /// the expiry sweep, which always releases tickets it previously
    /// reserved.
    ///
    /// # Panics
    ///
    /// Panics if `event_id` doesn't exist, or if the release would push
    /// `available_tickets` past `initial_tickets` — both indicate a bug in
    /// the sweep's bookkeeping, not a reachable client input.
    pub fn release(&mut self, event_id: u32, n: u16) {
        let idx = self
            .index_of(event_id)
            .expect("release called with nonexistent event_id");
        let event = &mut self.events[idx];
        event.available_tickets = event
            .available_tickets
            .checked_add(n)
            .filter(|&total| total <= event.initial_tickets)
            .expect("release would exceed initial_tickets");
    }

    fn index_of(&self, event_id: u32) -> Option<usize> {
        let idx = usize::try_from(event_id).ok()?;
        (idx < self.events.len()).then_some(idx)
    }
}
