// BEAM bindings
//
// parse_string              rows of unescaped binaries, default dialect
// parse_string_with_config  same with explicit delimiter / quote / line ending
// parse_string_zero_copy    sub-binaries of the input where possible
// parse_to_maps             first row as keys, one map per remaining row
// parse_string_parallel     rayon cell extraction on a dirty scheduler

use std::borrow::Cow;

use rustler::{Binary, Env, Error, NifResult, Term};

use crate::core::Backend;
use crate::dialect::Dialect;
use crate::parser::Rows;
use crate::strategy::{parse_boundaries, parse_parallel};
use crate::term::{
    boundaries_to_term_hybrid, cow_rows_to_term, header_keys, owned_rows_to_term, rows_to_maps,
};

/// Dialect for NIF calls: no header skipping, the Elixir side decides.
fn nif_dialect(delimiter: u8, quote: u8, line_ending: u8) -> NifResult<Dialect> {
    let dialect = Dialect::new()
        .with_delimiter(delimiter)
        .with_quote(quote)
        .with_line_ending(line_ending)
        .with_header(false);
    dialect.validate().map_err(|_| Error::BadArg)?;
    Ok(dialect)
}

fn cow_rows<'a>(bytes: &'a [u8], dialect: &'a Dialect) -> Vec<Vec<Cow<'a, [u8]>>> {
    Rows::new(bytes, dialect, Backend::detect())
        .map(|row| row.cells().map(|cell| cell.unescaped()).collect())
        .collect()
}

// ============================================================================
// Row parsing
// ============================================================================

/// Parse CSV string into list of rows
#[rustler::nif]
fn parse_string<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let dialect = nif_dialect(b',', b'"', b'\n')?;
    let rows = cow_rows(input.as_slice(), &dialect);
    Ok(cow_rows_to_term(env, rows))
}

/// Parse CSV with configurable delimiter, quote and line ending
#[rustler::nif]
fn parse_string_with_config<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    delimiter: u8,
    quote: u8,
    line_ending: u8,
) -> NifResult<Term<'a>> {
    let dialect = nif_dialect(delimiter, quote, line_ending)?;
    let rows = cow_rows(input.as_slice(), &dialect);
    Ok(cow_rows_to_term(env, rows))
}

/// Parse CSV using zero-copy sub-binaries where possible
#[rustler::nif]
fn parse_string_zero_copy<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    delimiter: u8,
    quote: u8,
) -> NifResult<Term<'a>> {
    let dialect = nif_dialect(delimiter, quote, b'\n')?;
    let boundaries = parse_boundaries(input.as_slice(), &dialect);
    boundaries_to_term_hybrid(env, input, boundaries, &dialect)
}

/// Parse CSV and return list of maps keyed by the first row
#[rustler::nif]
fn parse_to_maps<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    delimiter: u8,
    quote: u8,
) -> NifResult<Term<'a>> {
    let dialect = nif_dialect(delimiter, quote, b'\n')?;
    let mut rows = cow_rows(input.as_slice(), &dialect);
    if rows.is_empty() {
        return Ok(Term::list_new_empty(env));
    }
    let header = rows.remove(0);
    let keys = header_keys(env, &header);
    rows_to_maps(env, &keys, rows)
}

/// Parse CSV in parallel using rayon thread pool
/// Uses DirtyCpu scheduler since this can take significant time
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_string_parallel<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    delimiter: u8,
    quote: u8,
) -> NifResult<Term<'a>> {
    let dialect = nif_dialect(delimiter, quote, b'\n')?;
    let rows = parse_parallel(input.as_slice(), &dialect);
    Ok(owned_rows_to_term(env, rows))
}

// ============================================================================
// Memory Tracking NIFs (real numbers only with the memory_tracking feature)
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

/// Get current Rust heap allocation in bytes
#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    crate::tracking::ALLOCATED.load(Ordering::SeqCst)
}

/// Get peak Rust heap allocation since last reset
#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    crate::tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

/// Reset memory stats, returning (current, previous peak)
#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = crate::tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = crate::tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

/// Stub: returns 0 when memory_tracking is disabled
#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

/// Stub: returns 0 when memory_tracking is disabled
#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

/// Stub: returns (0, 0) when memory_tracking is disabled
#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}

rustler::init!("Elixir.StrideCSV.Native");
