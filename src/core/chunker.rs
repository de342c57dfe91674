// Window scanner (chunker)
//
// Answers `find(mode, first, last)` over one borrowed input. A rescan walks
// the range as generic prefix -> aligned 64-byte windows -> generic tail,
// recording every boundary it meets into the replay buffer so that later
// queries nested in the same range skip the classifier entirely.

use std::ops::{ControlFlow, Range};

use tracing::trace;

use super::classify::Classifier;
use super::parity::{self, QuoteState};
use super::replay::ReplayBuffer;
use super::{generic, Backend, BoundaryKind, BoundaryPair, FindMode, Structural, WINDOW};

/// Boundary scanner over one input.
///
/// Queries take `&mut self`; independent chunkers over the same input can
/// live on different threads.
#[derive(Debug, Clone)]
pub struct Chunker<'a> {
    input: &'a [u8],
    structural: Structural,
    backend: Backend,
    classifier: Option<Classifier>,
    state: QuoteState,
    // Offset at which `state` is valid.
    state_pos: Option<usize>,
    cached: Option<Range<usize>>,
    replay: ReplayBuffer,
    // Bytes walked by all rescans and scans.
    scanned: usize,
}

impl<'a> Chunker<'a> {
    pub fn new(input: &'a [u8], structural: Structural, backend: Backend) -> Self {
        let backend = backend.resolve();
        let classifier = match backend {
            Backend::Avx2 => Classifier::accelerated().or(Some(Classifier::portable())),
            Backend::Bitwise => Some(Classifier::portable()),
            Backend::Generic => None,
        };
        Chunker {
            input,
            structural,
            backend,
            classifier,
            state: QuoteState::default(),
            state_pos: None,
            cached: None,
            replay: ReplayBuffer::new(),
            scanned: 0,
        }
    }

    /// Locate the next boundaries in `[first, last)`.
    ///
    /// # Panics
    ///
    /// If `first > last` or `last` is past the end of the input.
    pub fn find(&mut self, mode: FindMode, first: usize, last: usize) -> BoundaryPair {
        assert!(
            first <= last && last <= self.input.len(),
            "invalid range {first}..{last} for input of {} bytes",
            self.input.len()
        );
        if first == last {
            return BoundaryPair::none(last);
        }

        if let Some(range) = &self.cached {
            if range.start <= first && last <= range.end {
                if let Some(pair) = self.replay.answer(mode, first, last) {
                    return pair;
                }
            }
        }
        self.rescan(mode, first, last)
    }

    fn rescan(&mut self, mode: FindMode, first: usize, last: usize) -> BoundaryPair {
        trace!(?mode, first, last, backend = ?self.backend, "chunker rescan");

        self.replay.clear(first);
        self.cached = Some(first..last);

        let mut state = self.entry_state(first);
        let mut search = Search::new(mode);
        let replay = &mut self.replay;
        let end = drive(
            self.input,
            self.structural,
            self.classifier,
            &mut state,
            first,
            last,
            |pos, kind| {
                replay.record(pos, kind);
                search.offer(pos, kind)
            },
        );
        self.replay.seal(end);
        self.state = state;
        self.state_pos = Some(end);
        self.scanned += end - first;

        search.result(last)
    }

    /// Scan all of `[first, last)` without stopping, reporting every
    /// unquoted boundary.
    ///
    /// Continues the quote state when `first` is where the previous scan
    /// ended, so consecutive ranges behave as one stream. Invalidates the
    /// replay cache.
    pub fn scan<F>(&mut self, first: usize, last: usize, mut emit: F)
    where
        F: FnMut(usize, BoundaryKind),
    {
        assert!(
            first <= last && last <= self.input.len(),
            "invalid range {first}..{last} for input of {} bytes",
            self.input.len()
        );
        self.cached = None;
        self.replay.clear(first);

        let mut state = self.entry_state(first);
        let end = drive(
            self.input,
            self.structural,
            self.classifier,
            &mut state,
            first,
            last,
            |pos, kind| {
                emit(pos, kind);
                ControlFlow::Continue(())
            },
        );
        self.state = state;
        self.state_pos = Some(end);
        self.scanned += end - first;
    }

    fn entry_state(&self, first: usize) -> QuoteState {
        if self.state_pos == Some(first) {
            self.state
        } else {
            QuoteState::default()
        }
    }

    /// Quote state where the last scan stopped.
    pub fn quote_state(&self) -> QuoteState {
        self.state
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    /// Total bytes the classifier or byte loop has walked, over every query.
    pub fn scanned_bytes(&self) -> usize {
        self.scanned
    }
}

// ---------------------------------------------------------------------------
// Scan driver
// ---------------------------------------------------------------------------

/// Walk `[first, last)`: generic up to the first aligned window, whole
/// windows while they fit, generic for the rest. A window is always reported
/// in full; a `Break` from `emit` ends the scan after that window.
fn drive<F>(
    input: &[u8],
    structural: Structural,
    classifier: Option<Classifier>,
    state: &mut QuoteState,
    first: usize,
    last: usize,
    mut emit: F,
) -> usize
where
    F: FnMut(usize, BoundaryKind) -> ControlFlow<()>,
{
    let Some(classifier) = classifier else {
        return stop_offset(generic::scan(input, structural, first, last, state, emit));
    };

    let addr = input.as_ptr() as usize + first;
    let aligned = (first + (addr.wrapping_neg() & (WINDOW - 1))).min(last);

    let mut pos = match generic::scan(input, structural, first, aligned, state, &mut emit) {
        ControlFlow::Break(end) => return end,
        ControlFlow::Continue(end) => end,
    };

    let mut stopped = false;
    while !stopped && pos + WINDOW <= last {
        let Ok(window) = <&[u8; WINDOW]>::try_from(&input[pos..pos + WINDOW]) else {
            break;
        };
        let [quotes, delimiters, line_ends] = classifier.classify(
            window,
            [structural.quote, structural.delimiter, structural.line_ending],
        );
        let inside = parity::resolve(quotes, state, &classifier).inside;

        let mut boundaries = (delimiters | line_ends) & !inside;
        while boundaries != 0 {
            let bit = boundaries.trailing_zeros() as usize;
            let kind = if delimiters >> bit & 1 == 1 {
                BoundaryKind::Delimiter
            } else {
                BoundaryKind::LineEnd
            };
            stopped |= emit(pos + bit, kind).is_break();
            boundaries &= boundaries - 1;
        }
        pos += WINDOW;
    }
    if stopped {
        return pos;
    }

    stop_offset(generic::scan(input, structural, pos, last, state, emit))
}

#[inline]
fn stop_offset(flow: ControlFlow<usize, usize>) -> usize {
    match flow {
        ControlFlow::Break(end) | ControlFlow::Continue(end) => end,
    }
}

/// Tracks the answer of one `find` while boundaries stream past.
struct Search {
    mode: FindMode,
    delimiter: Option<usize>,
    line_end: Option<usize>,
}

impl Search {
    fn new(mode: FindMode) -> Self {
        Search {
            mode,
            delimiter: None,
            line_end: None,
        }
    }

    fn done(&self) -> bool {
        match self.mode {
            FindMode::Delimiter => self.delimiter.is_some(),
            FindMode::LineEnd | FindMode::Either => self.line_end.is_some(),
        }
    }

    fn offer(&mut self, pos: usize, kind: BoundaryKind) -> ControlFlow<()> {
        if !self.done() {
            match (self.mode, kind) {
                (FindMode::Delimiter | FindMode::Either, BoundaryKind::Delimiter) => {
                    self.delimiter.get_or_insert(pos);
                }
                (FindMode::LineEnd | FindMode::Either, BoundaryKind::LineEnd) => {
                    self.line_end = Some(pos);
                }
                _ => {}
            }
        }
        if self.done() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn result(&self, last: usize) -> BoundaryPair {
        BoundaryPair {
            delimiter: self.delimiter.unwrap_or(last),
            line_end: self.line_end.unwrap_or(last),
        }
    }
}
