//! Cookie generation (spec.md §4.6).
//!
//! The decimal representation of the reservation id is written at the
//! front, but the generator then overwrites starting at index `L - 1`
//! (one before the end of that prefix) with random printable bytes — so the
//! final cookie keeps only the first `L - 1` decimal digits verbatim. This
//! off-by-one is part of the reference contract, not a bug to "fix".

use crate::rng::RandomSource;
use crate::wire::COOKIE_SIZE;

/// Lowest printable ASCII byte a cookie byte may take.
const PRINTABLE_LOW: u8 = 33;
/// Number of printable ASCII values in `[33, 126]`.
const PRINTABLE_RANGE: u8 = 94;

/// Generate a 48-byte cookie for a just-assigned `reservation_id`.
#[must_use]
pub fn generate(reservation_id: u32, rng: &mut dyn RandomSource) -> [u8; COOKIE_SIZE] {
    let decimal = reservation_id.to_string();
    let prefix_len = decimal.len();
    debug_assert!(prefix_len >= 1 && prefix_len <= COOKIE_SIZE);

    let mut cookie = [0u8; COOKIE_SIZE];
    cookie[..prefix_len].copy_from_slice(decimal.as_bytes());

    for byte in &mut cookie[prefix_len - 1..] {
        *byte = PRINTABLE_LOW + (rng.next_byte() % PRINTABLE_RANGE);
    }

    cookie
}
