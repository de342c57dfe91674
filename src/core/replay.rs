// Replay buffer: boundaries found by the most recent scan
//
// Entries are offsets from `begin` in strictly increasing order. The buffer
// is complete over [begin, complete_until): every unquoted boundary of that
// range is present. Dropped discoveries (buffer full, or offset past u32)
// end the complete range at the first one dropped.

use super::{BoundaryKind, BoundaryPair, FindMode};

pub const REPLAY_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    offset: u32,
    kind: BoundaryKind,
}

const EMPTY_ENTRY: Entry = Entry {
    offset: 0,
    kind: BoundaryKind::Delimiter,
};

#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    begin: usize,
    entries: [Entry; REPLAY_CAPACITY],
    len: usize,
    complete_until: usize,
    truncated: bool,
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        ReplayBuffer::new()
    }
}

impl ReplayBuffer {
    pub fn new() -> Self {
        ReplayBuffer {
            begin: 0,
            entries: [EMPTY_ENTRY; REPLAY_CAPACITY],
            len: 0,
            complete_until: 0,
            truncated: false,
        }
    }

    /// Drop all entries and start a new scan at `begin`.
    pub fn clear(&mut self, begin: usize) {
        self.begin = begin;
        self.len = 0;
        self.complete_until = begin;
        self.truncated = false;
    }

    pub fn record(&mut self, pos: usize, kind: BoundaryKind) {
        debug_assert!(pos >= self.begin);
        debug_assert!(self.last_pos().map_or(true, |p| pos > p));

        if self.truncated {
            return;
        }
        let offset = match u32::try_from(pos - self.begin) {
            Ok(offset) if self.len < REPLAY_CAPACITY => offset,
            _ => {
                self.truncated = true;
                self.complete_until = pos;
                return;
            }
        };
        self.entries[self.len] = Entry { offset, kind };
        self.len += 1;
    }

    /// Mark the scan finished at `scanned_end`.
    pub fn seal(&mut self, scanned_end: usize) {
        if !self.truncated {
            self.complete_until = scanned_end;
        }
    }

    /// Answer a query from the recorded entries.
    ///
    /// `None` means the buffer cannot decide and the caller must rescan.
    pub fn answer(&self, mode: FindMode, first: usize, last: usize) -> Option<BoundaryPair> {
        if first < self.begin {
            return None;
        }
        let limit = last.min(self.complete_until);
        let mut delimiter = None;

        for (pos, kind) in self.iter() {
            if pos < first {
                continue;
            }
            if pos >= limit {
                break;
            }
            match (mode, kind) {
                (FindMode::Delimiter, BoundaryKind::Delimiter) => {
                    return Some(BoundaryPair {
                        delimiter: pos,
                        line_end: last,
                    });
                }
                (FindMode::LineEnd | FindMode::Either, BoundaryKind::LineEnd) => {
                    let delimiter = match mode {
                        FindMode::Either => delimiter.unwrap_or(last),
                        _ => last,
                    };
                    return Some(BoundaryPair {
                        delimiter,
                        line_end: pos,
                    });
                }
                (FindMode::Either, BoundaryKind::Delimiter) => {
                    delimiter.get_or_insert(pos);
                }
                _ => {}
            }
        }

        if last > self.complete_until {
            return None;
        }
        Some(BoundaryPair {
            delimiter: match mode {
                FindMode::Either => delimiter.unwrap_or(last),
                _ => last,
            },
            line_end: last,
        })
    }

    /// Absolute positions and kinds, in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, BoundaryKind)> + '_ {
        self.entries[..self.len]
            .iter()
            .map(move |e| (self.begin + e.offset as usize, e.kind))
    }

    fn last_pos(&self) -> Option<usize> {
        self.iter().last().map(|(p, _)| p)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == REPLAY_CAPACITY
    }

    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    #[inline]
    pub fn complete_until(&self) -> usize {
        self.complete_until
    }
}
