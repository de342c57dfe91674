// Zero-Copy Strategy: Returns field boundaries for sub-binary term construction
//
// Instead of copying field data, this strategy returns (start, end) positions
// that can be used to create BEAM sub-binaries referencing the original input.
// One uninterrupted chunker scan feeds the whole table.

use tracing::debug;

use crate::core::{Backend, BoundaryKind, Chunker};
use crate::dialect::Dialect;
use crate::parser::row_end;

/// Raw cell spans per row, header dropped when the dialect has one.
pub fn parse_boundaries(input: &[u8], dialect: &Dialect) -> Vec<Vec<(usize, usize)>> {
    parse_boundaries_with_backend(input, dialect, Backend::detect())
}

pub fn parse_boundaries_with_backend(
    input: &[u8],
    dialect: &Dialect,
    backend: Backend,
) -> Vec<Vec<(usize, usize)>> {
    let mut rows: Vec<Vec<(usize, usize)>> = Vec::with_capacity(input.len() / 50 + 4);
    let mut row: Vec<(usize, usize)> = Vec::with_capacity(8);
    let mut row_start = 0;
    let mut cell_start = 0;

    let mut chunker = Chunker::new(input, dialect.structural(), backend);
    chunker.scan(0, input.len(), |pos, kind| match kind {
        BoundaryKind::Delimiter => {
            row.push((cell_start, pos));
            cell_start = pos + 1;
        }
        BoundaryKind::LineEnd => {
            let end = row_end(input, row_start, pos, dialect).max(cell_start);
            row.push((cell_start, end));
            rows.push(std::mem::replace(&mut row, Vec::with_capacity(8)));
            row_start = pos + 1;
            cell_start = pos + 1;
        }
    });

    if row_start < input.len() {
        let end = row_end(input, row_start, input.len(), dialect).max(cell_start);
        row.push((cell_start, end));
        rows.push(row);
    }

    if dialect.has_header && !rows.is_empty() {
        rows.remove(0);
    }
    debug!(rows = rows.len(), bytes = input.len(), "zero-copy boundaries");
    rows
}
