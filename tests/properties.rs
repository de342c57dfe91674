// Property tests for the structural scanner
//
// Inputs are drawn from a small alphabet heavy in structural bytes so that
// quote runs, quoted line endings and window-straddling spans are common.

use proptest::prelude::*;

use stridecsv::strategy::zero_copy::parse_boundaries_with_backend;
use stridecsv::{Backend, BoundaryKind, Chunker, Dialect, FindMode, Parser, QuoteState, Structural};

fn csvish() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![
            4 => Just(b'"'),
            3 => Just(b','),
            2 => Just(b'\n'),
            1 => Just(b'\r'),
            1 => Just(b' '),
            6 => prop::sample::select(b"abcxyz019".to_vec()),
        ],
        0..400,
    )
}

fn boundaries(input: &[u8], backend: Backend) -> (Vec<(usize, BoundaryKind)>, QuoteState) {
    let mut out = Vec::new();
    let mut chunker = Chunker::new(input, Structural::default(), backend);
    chunker.scan(0, input.len(), |p, k| out.push((p, k)));
    (out, chunker.quote_state())
}

fn table(input: &[u8], backend: Backend) -> Vec<Vec<Vec<u8>>> {
    let parser = Parser::with_dialect(input, Dialect::new().with_header(false))
        .unwrap()
        .with_backend(backend);
    parser
        .rows()
        .map(|row| row.cells().map(|c| c.raw().to_vec()).collect())
        .collect()
}

/// Byte-at-a-time reference written independently of the scanner: a quote
/// toggles unless the next byte is also a quote inside a quoted span.
fn reference(input: &[u8]) -> Vec<(usize, BoundaryKind)> {
    let mut out = Vec::new();
    let mut quoted = false;
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'"' if quoted && input.get(i + 1) == Some(&b'"') => i += 1,
            b'"' => quoted = !quoted,
            b',' if !quoted => out.push((i, BoundaryKind::Delimiter)),
            b'\n' if !quoted => out.push((i, BoundaryKind::LineEnd)),
            _ => {}
        }
        i += 1;
    }
    out
}

proptest! {
    #[test]
    fn backends_are_equivalent(input in csvish()) {
        let expected = boundaries(&input, Backend::Generic);
        for backend in Backend::available() {
            prop_assert_eq!(&boundaries(&input, backend), &expected, "{:?}", backend);
        }
    }

    #[test]
    fn matches_reference_scanner(input in csvish()) {
        let (found, _) = boundaries(&input, Backend::detect());
        prop_assert_eq!(found, reference(&input));
    }

    #[test]
    fn split_scan_equals_whole_scan(input in csvish(), split in any::<prop::sample::Index>()) {
        let k = split.index(input.len() + 1);
        for backend in Backend::available() {
            let (whole, whole_state) = boundaries(&input, backend);
            let mut parts = Vec::new();
            let mut chunker = Chunker::new(&input, Structural::default(), backend);
            chunker.scan(0, k, |p, kind| parts.push((p, kind)));
            chunker.scan(k, input.len(), |p, kind| parts.push((p, kind)));
            prop_assert_eq!(&parts, &whole, "{:?} split at {}", backend, k);
            prop_assert_eq!(chunker.quote_state(), whole_state);
        }
    }

    #[test]
    fn narrower_query_matches_fresh_scanner(input in csvish()) {
        let len = input.len();
        for backend in Backend::available() {
            let mut warm = Chunker::new(&input, Structural::default(), backend);
            warm.find(FindMode::Either, 0, len);
            for mode in [FindMode::LineEnd, FindMode::Delimiter, FindMode::Either] {
                let mut fresh = Chunker::new(&input, Structural::default(), backend);
                prop_assert_eq!(warm.find(mode, 0, len), fresh.find(mode, 0, len));
            }
        }
    }

    #[test]
    fn rows_and_boundary_table_agree(input in csvish()) {
        let dialect = Dialect::new().with_header(false);
        for backend in Backend::available() {
            let spans = parse_boundaries_with_backend(&input, &dialect, backend);
            let from_spans: Vec<Vec<Vec<u8>>> = spans
                .iter()
                .map(|row| row.iter().map(|&(s, e)| input[s..e].to_vec()).collect())
                .collect();
            prop_assert_eq!(table(&input, backend), from_spans);
        }
    }

    #[test]
    fn parsing_is_idempotent(input in csvish()) {
        let backend = Backend::detect();
        prop_assert_eq!(table(&input, backend), table(&input, backend));
    }

    #[test]
    fn quote_run_parity_decides_state(n in 1usize..200, lead in 0usize..70) {
        let mut input = vec![b'a'; lead];
        input.extend(std::iter::repeat(b'"').take(n));
        input.extend_from_slice(b"a,b");
        for backend in Backend::available() {
            let (found, state) = boundaries(&input, backend);
            let delimiter_seen = found.iter().any(|&(_, k)| k == BoundaryKind::Delimiter);
            prop_assert_eq!(delimiter_seen, n % 2 == 0, "{:?}", backend);
            prop_assert_eq!(state.quoted, n % 2 == 1);
        }
    }
}
