//! Ticket identifier issuance and encoding (spec.md §4.5).

/// Monotonic counter allocating contiguous blocks of ticket ids.
///
/// Never recycles; the counter only ever grows. A 64-bit counter is used
/// for headroom, but the admissible range (given the 65507-byte cap on a
/// `TICKETS` response) is 49 bits.
#[derive(Debug, Clone, Default)]
pub struct TicketIssuer {
    next: u64,
}

impl TicketIssuer {
    /// A fresh issuer starting at counter `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate a contiguous block of `n` ticket ids, returning their
    /// encoded 7-byte forms in order. Advances the counter by `n`.
    pub fn allocate(&mut self, n: u16) -> Vec<[u8; 7]> {
        let first = self.next;
        self.next += u64::from(n);
        (0..u64::from(n)).map(|offset| encode(first + offset)).collect()
    }

    /// The next value that would be handed out by [`TicketIssuer::allocate`].
    #[must_use]
    pub const fn peek_next(&self) -> u64 {
        self.next
    }
}

/// Encode a 49-bit-range value as 7 little-endian base-36 ASCII digits.
#[must_use]
pub fn encode(mut value: u64) -> [u8; 7] {
    let mut out = [0u8; 7];
    for slot in &mut out {
        let digit = (value % 36) as u8;
        *slot = if digit < 10 {
            b'0' + digit
        } else {
            b'A' + digit - 10
        };
        value /= 36;
    }
    out
}
