// Parallel Parser using Rayon
//
// Strategy:
// 1. Single-threaded: find all row spans with one line-end scanner (the
//    only phase that has to follow quote state from the top of the input)
// 2. Parallel: split and unescape each row on its own chunker
//
// Results are owned Vec<Vec<Vec<u8>>> so callers that cannot share borrows
// across threads (BEAM term building) convert on their own thread.

use rayon::prelude::*;
use tracing::debug;

use crate::core::Backend;
use crate::dialect::Dialect;
use crate::parser::{Parser, Row};
use crate::source::Source;

/// Parse `input` in parallel into owned, unescaped cells.
pub fn parse_parallel(input: &[u8], dialect: &Dialect) -> Vec<Vec<Vec<u8>>> {
    parse_parallel_with_backend(input, dialect, Backend::detect())
}

pub fn parse_parallel_with_backend(
    input: &[u8],
    dialect: &Dialect,
    backend: Backend,
) -> Vec<Vec<Vec<u8>>> {
    let parser = Parser::from_parts(input, dialect.clone(), backend);

    // Phase 1: row spans (single-threaded, quote-aware)
    let rows: Vec<Row<'_>> = parser.rows().collect();
    debug!(rows = rows.len(), bytes = input.len(), "parallel parse");

    // Phase 2: cells in parallel
    rows.into_par_iter().map(|row| owned_cells(&row)).collect()
}

/// Parse many independent inputs, one scanner per source.
pub fn parse_sources_parallel<S>(sources: &[S], dialect: &Dialect) -> Vec<Vec<Vec<Vec<u8>>>>
where
    S: Source + Sync,
{
    let backend = Backend::detect();
    debug!(sources = sources.len(), "parallel parse of sources");
    sources
        .par_iter()
        .map(|source| {
            let parser = Parser::from_parts(source.as_bytes(), dialect.clone(), backend);
            let rows: Vec<Vec<Vec<u8>>> = parser.rows().map(|row| owned_cells(&row)).collect();
            rows
        })
        .collect()
}

fn owned_cells(row: &Row<'_>) -> Vec<Vec<u8>> {
    row.cells().map(|cell| cell.unescaped().into_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> Dialect {
        Dialect::new().with_header(false)
    }

    #[test]
    fn test_parallel_simple() {
        let rows = parse_parallel(b"a,b,c\n1,2,3\n", &raw());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(rows[1], vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn test_parallel_skips_header() {
        let rows = parse_parallel(b"x,y\n1,2\n", &Dialect::default());
        assert_eq!(rows, vec![vec![b"1".to_vec(), b"2".to_vec()]]);
    }

    #[test]
    fn test_parallel_many_rows() {
        let mut input = Vec::new();
        for i in 0..1000 {
            input.extend_from_slice(format!("{},\"{}\",{}\n", i, i + 1, i + 2).as_bytes());
        }

        let rows = parse_parallel(&input, &raw());
        assert_eq!(rows.len(), 1000);
        assert_eq!(rows[0], vec![b"0".to_vec(), b"1".to_vec(), b"2".to_vec()]);
        assert_eq!(
            rows[999],
            vec![b"999".to_vec(), b"1000".to_vec(), b"1001".to_vec()]
        );
    }

    #[test]
    fn test_parallel_quoted_newline() {
        let rows = parse_parallel(b"a,\"line1\nline2\",c\nd,e,f\n", &raw());
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![b"a".to_vec(), b"line1\nline2".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn test_sources_parallel() {
        let sources = vec!["a,b\n".to_string(), String::new(), "\"x\"\"\",y".to_string()];
        let parsed = parse_sources_parallel(&sources, &raw());
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], vec![vec![b"a".to_vec(), b"b".to_vec()]]);
        assert!(parsed[1].is_empty());
        assert_eq!(parsed[2], vec![vec![b"x\"".to_vec(), b"y".to_vec()]]);
    }
}
