// Shared term building utilities for converting parsed rows to Elixir terms

use std::borrow::Cow;

use rustler::{Binary, Env, NewBinary, NifResult, Term};

use crate::core::field::{self, ValueSpan};
use crate::dialect::Dialect;

fn bytes_to_term<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Convert owned rows to Elixir term (for the parallel parser)
pub fn owned_rows_to_term<'a>(env: Env<'a>, rows: Vec<Vec<Vec<u8>>>) -> Term<'a> {
    // Build list in reverse (efficient for cons lists)
    let mut list = Term::list_new_empty(env);

    for row in rows.into_iter().rev() {
        let mut row_term = Term::list_new_empty(env);
        for field in row.into_iter().rev() {
            row_term = row_term.list_prepend(bytes_to_term(env, &field));
        }
        list = list.list_prepend(row_term);
    }

    list
}

/// Convert Cow-based rows to Elixir term
pub fn cow_rows_to_term<'a>(env: Env<'a>, rows: Vec<Vec<Cow<'_, [u8]>>>) -> Term<'a> {
    let mut list = Term::list_new_empty(env);

    for row in rows.into_iter().rev() {
        let mut row_term = Term::list_new_empty(env);
        for field in row.into_iter().rev() {
            row_term = row_term.list_prepend(bytes_to_term(env, &field));
        }
        list = list.list_prepend(row_term);
    }

    list
}

/// One cell from its raw span: a sub-binary of `input` when the value is a
/// plain slice of it, a fresh binary when doubled quotes had to collapse.
fn span_to_term<'a>(
    env: Env<'a>,
    input: &Binary<'a>,
    (start, end): (usize, usize),
    dialect: &Dialect,
) -> NifResult<Term<'a>> {
    match field::unescaped_span(input.as_slice(), start..end, &dialect.trim, dialect.quote) {
        ValueSpan::Borrowed(range) => {
            Ok(input.make_subbinary(range.start, range.len())?.to_term(env))
        }
        ValueSpan::Owned(value) => Ok(bytes_to_term(env, &value)),
    }
}

/// Convert zero-copy boundaries to an Elixir list of lists, sharing the
/// input binary wherever possible.
pub fn boundaries_to_term_hybrid<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    boundaries: Vec<Vec<(usize, usize)>>,
    dialect: &Dialect,
) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);

    for row in boundaries.into_iter().rev() {
        let mut row_term = Term::list_new_empty(env);
        for span in row.into_iter().rev() {
            row_term = row_term.list_prepend(span_to_term(env, &input, span, dialect)?);
        }
        list = list.list_prepend(row_term);
    }

    Ok(list)
}

/// Build one map per row from header key terms. Extra cells are dropped,
/// missing cells are left out of the map.
pub fn rows_to_maps<'a>(
    env: Env<'a>,
    keys: &[Term<'a>],
    rows: Vec<Vec<Cow<'_, [u8]>>>,
) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);

    for row in rows.into_iter().rev() {
        let count = keys.len().min(row.len());
        let values: Vec<Term<'a>> = row
            .iter()
            .take(count)
            .map(|value| bytes_to_term(env, value))
            .collect();
        let map = Term::map_from_term_arrays(env, &keys[..count], &values)?;
        list = list.list_prepend(map);
    }

    Ok(list)
}

/// Header cell values as binary terms (used as map keys).
pub fn header_keys<'a>(env: Env<'a>, header: &[Cow<'_, [u8]>]) -> Vec<Term<'a>> {
    header.iter().map(|key| bytes_to_term(env, key)).collect()
}
