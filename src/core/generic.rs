// Generic scanner: the byte-at-a-time twin of the window path
//
// A quote flips `carry`. Any other byte first settles a pending toggle and is
// then tested as a boundary when outside quotes. This is exactly where the
// window path puts its toggles (the first byte after an odd quote run), so
// the two can hand state to each other at any offset.

use std::ops::ControlFlow;

use super::{BoundaryKind, QuoteState, Structural};

/// Scan `input[from..to]`, reporting unquoted boundaries to `emit`.
///
/// Returns `Continue(to)` after a full scan, or `Break` with the offset one
/// past the boundary for which `emit` broke. `state` is valid at that offset.
#[inline]
pub fn scan<F>(
    input: &[u8],
    structural: Structural,
    from: usize,
    to: usize,
    state: &mut QuoteState,
    mut emit: F,
) -> ControlFlow<usize, usize>
where
    F: FnMut(usize, BoundaryKind) -> ControlFlow<()>,
{
    let Structural {
        delimiter,
        line_ending,
        quote,
    } = structural;

    for (pos, &byte) in (from..to).zip(&input[from..to]) {
        if byte == quote {
            state.carry = !state.carry;
            continue;
        }
        if state.carry {
            state.quoted = !state.quoted;
            state.carry = false;
        }
        if state.quoted {
            continue;
        }
        let kind = if byte == delimiter {
            BoundaryKind::Delimiter
        } else if byte == line_ending {
            BoundaryKind::LineEnd
        } else {
            continue;
        };
        if emit(pos, kind).is_break() {
            return ControlFlow::Break(pos + 1);
        }
    }
    ControlFlow::Continue(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> (Vec<(usize, BoundaryKind)>, QuoteState) {
        let mut out = Vec::new();
        let mut state = QuoteState::default();
        let _ = scan(input, Structural::default(), 0, input.len(), &mut state, |p, k| {
            out.push((p, k));
            ControlFlow::Continue(())
        });
        (out, state)
    }

    #[test]
    fn test_unquoted_boundaries() {
        let (found, state) = collect(b"a,b\nc");
        assert_eq!(
            found,
            vec![(1, BoundaryKind::Delimiter), (3, BoundaryKind::LineEnd)]
        );
        assert_eq!(state, QuoteState::default());
    }

    #[test]
    fn test_quoted_boundaries_are_skipped() {
        let (found, _) = collect(b"\"a,\nb\",c");
        assert_eq!(found, vec![(6, BoundaryKind::Delimiter)]);
    }

    #[test]
    fn test_escaped_quotes() {
        let (found, state) = collect(b"\"a\"\"b\",c");
        assert_eq!(found, vec![(6, BoundaryKind::Delimiter)]);
        assert_eq!(state, QuoteState::default());
    }

    #[test]
    fn test_pending_toggle_at_end() {
        let (_, state) = collect(b"\"abc\"");
        assert_eq!(
            state,
            QuoteState {
                quoted: true,
                carry: true
            }
        );
        let (_, state) = collect(b"\"abc\"\"");
        assert_eq!(
            state,
            QuoteState {
                quoted: true,
                carry: false
            }
        );
    }

    #[test]
    fn test_break_stops_after_boundary() {
        let input = b"a,b,c";
        let mut state = QuoteState::default();
        let mut seen = 0;
        let stop = scan(input, Structural::default(), 0, input.len(), &mut state, |_, _| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert_eq!(stop, ControlFlow::Break(2));
        assert_eq!(seen, 1);
    }
}
