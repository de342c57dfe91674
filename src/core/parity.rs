// Quote-parity engine
//
// Decides, for one 64-byte window, which bytes sit inside a quoted span.
// A quote run toggles the quoted state iff its length is odd: in `""` the
// second quote pairs with the first as an escaped literal. Runs are
// classified by the parity of their start index and their ends found with
// one 64-bit addition per class, the same trick used for odd backslash
// sequences in bit-parallel JSON scanners. The toggle lands on the first
// byte after an odd run.

use super::classify::Classifier;

const EVEN_BITS: u64 = 0x5555_5555_5555_5555;
const ODD_BITS: u64 = !EVEN_BITS;

/// Quote state at a byte position.
///
/// `quoted` excludes a quote run still in progress; `carry` is set when the
/// run ending exactly at this position has odd length so far, meaning the
/// next non-quote byte flips `quoted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteState {
    pub quoted: bool,
    pub carry: bool,
}

/// Per-window output of `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParity {
    /// Bytes inside a quoted span.
    pub inside: u64,
    /// Bytes where the quoted state flips.
    pub toggles: u64,
}

/// Find the toggle positions of a window's quote mask.
///
/// Returns the toggles and whether an odd run reaches past bit 63.
#[inline]
pub fn toggles(quotes: u64, carry_in: bool) -> (u64, bool) {
    let carry = u64::from(carry_in);
    let starts = quotes & !(quotes << 1);

    // A run continuing from the previous window already has odd length, so
    // bit 0 belongs to the other class.
    let even_start_mask = EVEN_BITS ^ carry;
    let even_starts = starts & even_start_mask;
    let odd_starts = starts & !even_start_mask;

    let even_carries = quotes.wrapping_add(even_starts);
    let (mut odd_carries, overflow) = quotes.overflowing_add(odd_starts);
    // An odd run that ended at bit 63 of the previous window toggles at bit 0.
    odd_carries |= carry;

    let even_toggles = even_carries & !quotes & ODD_BITS;
    let odd_toggles = odd_carries & !quotes & EVEN_BITS;
    (even_toggles | odd_toggles, overflow)
}

/// Resolve one window and advance `state` past it.
#[inline]
pub fn resolve(quotes: u64, state: &mut QuoteState, classifier: &Classifier) -> WindowParity {
    let (toggles, carry_out) = toggles(quotes, state.carry);
    let mut inside = classifier.prefix_xor(toggles);
    if state.quoted {
        inside = !inside;
    }
    state.quoted = inside >> 63 == 1;
    state.carry = carry_out;
    WindowParity { inside, toggles }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bytes: &[u8], target: u8) -> u64 {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == target)
            .fold(0, |m, (i, _)| m | (1 << i))
    }

    fn bits(m: u64) -> Vec<u32> {
        (0..64).filter(|i| m >> i & 1 == 1).collect()
    }

    #[test]
    fn test_escaped_quote_pair_does_not_toggle() {
        let input = b"\"a\"\"b\",c";
        let (t, carry) = toggles(mask(input, b'"'), false);
        assert_eq!(bits(t), vec![1, 6]);
        assert!(!carry);

        let mut state = QuoteState::default();
        let p = resolve(mask(input, b'"'), &mut state, &Classifier::portable());
        // the delimiter at 6 is outside, the escaped pair is inside
        assert_eq!(p.inside >> 6 & 1, 0);
        assert_eq!(p.inside >> 3 & 1, 1);
        assert_eq!(p.inside >> 4 & 1, 1);
        assert_eq!(state, QuoteState::default());
    }

    #[test]
    fn test_run_parity_decides_toggle() {
        for n in 1..10usize {
            let q: u64 = (1 << n) - 1;
            let (t, carry) = toggles(q << 3, false);
            if n % 2 == 1 {
                assert_eq!(bits(t), vec![3 + n as u32], "run of {n}");
            } else {
                assert_eq!(t, 0, "run of {n}");
            }
            assert!(!carry);
        }
    }

    #[test]
    fn test_odd_run_at_window_end_carries() {
        let (t, carry) = toggles(1 << 63, false);
        assert_eq!(t, 0);
        assert!(carry);

        // next window starts with a non-quote: toggle lands on bit 0
        let (t, carry) = toggles(0, true);
        assert_eq!(bits(t), vec![0]);
        assert!(!carry);
    }

    #[test]
    fn test_even_run_across_windows() {
        // bits 62,63 then bits 0,1 of the next window: run of four
        let (t, carry) = toggles(0b11 << 62, false);
        assert_eq!(t, 0);
        assert!(!carry);
        let (t, carry) = toggles(0b11, carry);
        assert_eq!(t, 0);
        assert!(!carry);

        // bit 63 then bit 0: run of two, no toggle
        let (_, carry) = toggles(1 << 63, false);
        let (t, carry) = toggles(1, carry);
        assert_eq!(t, 0);
        assert!(!carry);
    }

    #[test]
    fn test_full_window_of_quotes_passes_carry_through() {
        assert_eq!(toggles(u64::MAX, true), (0, true));
        assert_eq!(toggles(u64::MAX, false), (0, false));
    }

    #[test]
    fn test_quoted_state_spans_windows() {
        let c = Classifier::portable();
        let mut state = QuoteState::default();

        // open at bit 10, never closed
        let p = resolve(1 << 10, &mut state, &c);
        assert_eq!(p.inside, !0u64 << 11);
        assert!(state.quoted);

        // whole next window is inside
        let p = resolve(0, &mut state, &c);
        assert_eq!(p.inside, u64::MAX);
        assert!(state.quoted);

        // close at bit 5: bits 0..=5 inside, bit 6 onwards outside
        let p = resolve(1 << 5, &mut state, &c);
        assert_eq!(p.inside, (1 << 6) - 1);
        assert!(!state.quoted);
    }

    #[test]
    fn test_accelerated_matches_portable() {
        let Some(fast) = Classifier::accelerated() else {
            return;
        };
        let slow = Classifier::portable();
        for &q in &[0u64, 1, 1 << 63, 0xF0F0_0000_0000_0F0F, u64::MAX, 0x1234_5678_9ABC_DEF0] {
            for quoted in [false, true] {
                for carry in [false, true] {
                    let mut a = QuoteState { quoted, carry };
                    let mut b = a;
                    assert_eq!(resolve(q, &mut a, &fast), resolve(q, &mut b, &slow));
                    assert_eq!(a, b);
                }
            }
        }
    }
}
