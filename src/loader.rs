//! Events-file loader — an external collaborator per spec.md §1: it
//! produces the ordered `(description, initial_ticket_count)` list the core
//! consumes, but living outside the core's scope.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::catalog::{Catalog, Event};
use crate::error::StartupError;
use crate::wire::events_entry_fits;

/// Load the events file at `path` into a [`Catalog`].
///
/// Reads alternating lines (`description`, `ticket_count`) and stops once
/// adding the next event would push the serialized `EVENTS` response past
/// [`crate::wire::MAX_DATAGRAM_SIZE`] — that's a silent truncation per
/// spec.md §4.2's loader contract, not an error.
///
/// # Errors
///
/// Returns [`StartupError`] if the file can't be read, is empty, ends
/// mid-record, a description is outside `1..=255` bytes, or a ticket count
/// fails to parse as `0..=65535`.
pub fn load_events(path: &Path) -> Result<Catalog, StartupError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StartupError::EventsFileIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = contents.lines().enumerate();
    let mut events = Vec::new();
    let mut prefix_sum: usize = 1; // opcode byte

    loop {
        let Some((desc_line_no, description)) = lines.next() else {
            break;
        };

        let desc_len = description.len();
        if desc_len == 0 || desc_len > 255 {
            return Err(StartupError::InvalidDescriptionLength {
                path: owned(path),
                line: desc_line_no + 1,
                len: desc_len,
            });
        }

        let Some((count_line_no, count_text)) = lines.next() else {
            return Err(StartupError::TruncatedRecord { path: owned(path) });
        };

        let ticket_count: u16 = count_text
            .trim()
            .parse()
            .map_err(|_| StartupError::InvalidTicketCount {
                path: owned(path),
                line: count_line_no + 1,
                value: count_text.to_string(),
            })?;

        if !events_entry_fits(prefix_sum, desc_len) {
            break;
        }
        prefix_sum += 7 + desc_len;

        events.push(Event::new(Bytes::copy_from_slice(description.as_bytes()), ticket_count));
    }

    if events.is_empty() {
        return Err(StartupError::EmptyEventsFile { path: owned(path) });
    }

    Ok(Catalog::new(events))
}

fn owned(path: &Path) -> PathBuf {
    path.to_path_buf()
}
