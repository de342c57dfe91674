// Field extraction: quote stripping, trimming and doubled-quote unescaping
//
// Order matters: the outer quote pair is stripped from the raw span first
// (only when the span itself starts and ends with the quote), then the trim
// set is removed, then doubled quotes collapse. A quoted value padded with
// spaces outside the quotes keeps its quotes; spaces inside quotes are
// trimmed.

use std::borrow::Cow;
use std::ops::Range;

/// Remove bytes in `trim` from both ends of `field`.
#[inline]
pub fn trim<'a>(field: &'a [u8], trim: &[u8]) -> &'a [u8] {
    if trim.is_empty() {
        return field;
    }
    let start = field
        .iter()
        .position(|b| !trim.contains(b))
        .unwrap_or(field.len());
    let end = field
        .iter()
        .rposition(|b| !trim.contains(b))
        .map_or(start, |i| i + 1);
    &field[start..end]
}

/// Drop one surrounding quote pair, if `field` has one.
#[inline]
pub fn strip_quotes(field: &[u8], quote: u8) -> &[u8] {
    match field {
        [first, inner @ .., last] if *first == quote && *last == quote => inner,
        _ => field,
    }
}

/// Collapse each doubled quote into one.
/// Returns Cow::Borrowed when no unescaping needed, Cow::Owned when we had to allocate.
#[inline]
pub fn collapse_quotes(field: &[u8], quote: u8) -> Cow<'_, [u8]> {
    // Fast path: no doubled quote anywhere
    if !field.windows(2).any(|w| w[0] == quote && w[1] == quote) {
        return Cow::Borrowed(field);
    }

    // Slow path: keep one quote of each pair
    let mut result = Vec::with_capacity(field.len());
    let mut i = 0;
    while i < field.len() {
        result.push(field[i]);
        if field[i] == quote && i + 1 < field.len() && field[i + 1] == quote {
            i += 2;
        } else {
            i += 1;
        }
    }
    Cow::Owned(result)
}

/// Cell text with its quote pair stripped and the trim set removed.
#[inline]
pub fn cell_trimmed<'a>(raw: &'a [u8], trim_set: &[u8], quote: u8) -> &'a [u8] {
    trim(strip_quotes(raw, quote), trim_set)
}

/// Cell value: `cell_trimmed` with doubled quotes collapsed.
#[inline]
pub fn cell_unescaped<'a>(raw: &'a [u8], trim_set: &[u8], quote: u8) -> Cow<'a, [u8]> {
    collapse_quotes(cell_trimmed(raw, trim_set, quote), quote)
}

/// A cell value as seen from the whole input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSpan {
    /// The value is `input[range]` unchanged.
    Borrowed(Range<usize>),
    /// Doubled quotes had to collapse into new bytes.
    Owned(Vec<u8>),
}

/// Unescaped value of the cell `input[span]`, located in `input` when no
/// bytes had to change. Lets callers share the input buffer (sub-binaries)
/// instead of copying.
pub fn unescaped_span(input: &[u8], span: Range<usize>, trim_set: &[u8], quote: u8) -> ValueSpan {
    let trimmed = cell_trimmed(&input[span], trim_set, quote);
    match collapse_quotes(trimmed, quote) {
        Cow::Borrowed(value) => {
            let start = value.as_ptr() as usize - input.as_ptr() as usize;
            ValueSpan::Borrowed(start..start + value.len())
        }
        Cow::Owned(value) => ValueSpan::Owned(value),
    }
}
