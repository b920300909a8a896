//! xmlscan - Context-sensitive XML lexical scanner
//!
//! Entry points:
//! - Whole document: `scan` returns every unit up to EOF
//! - Batch: `scan_many` tokenizes independent documents on the rayon pool
//! - Pull: `scanner_*` drives a scanner one unit at a time, optionally
//!   forcing the context the next unit is read in

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod core;
mod resource;
mod strategy;
mod term;

use crate::core::context::Context;
use crate::core::error::ScanError;
use resource::{ScannerRef, ScannerResource};
use term::{context_to_term, result_to_term, term_to_context, unit_to_term, units_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Whole Document Scanning
// ============================================================================

/// Scan a document and return `{:ok, units}` or `{:error, reason}`
#[rustler::nif]
fn scan<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let result = strategy::scan_bytes(input.as_slice());
    result_to_term(env, result, |units| units_to_term(env, &units))
}

/// Scan several documents in parallel, one result per document
#[rustler::nif(schedule = "DirtyCpu")]
fn scan_many<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    let docs: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();
    let results = strategy::scan_parallel(&docs);

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        let term = result_to_term(env, result, |units| units_to_term(env, &units))?;
        list = list.list_prepend(term);
    }
    Ok(list)
}

// ============================================================================
// Pull Scanner
// ============================================================================

/// Create a scanner positioned at document start
#[rustler::nif]
fn scanner_new<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match ScannerResource::new(input.as_slice()) {
        Ok(resource) => Ok(ResourceArc::new(resource).encode(env)),
        Err(e) => Ok((term::error(), term::scan_error_to_term(env, &e)?).encode(env)),
    }
}

/// Read the next unit in the scanner's current context
#[rustler::nif]
fn scanner_next<'a>(env: Env<'a>, scanner: ScannerRef) -> NifResult<Term<'a>> {
    next_unit(env, &scanner, None)
}

/// Read the next unit in a forced context
#[rustler::nif]
fn scanner_next_in<'a>(env: Env<'a>, scanner: ScannerRef, context: Term<'a>) -> NifResult<Term<'a>> {
    let context = term_to_context(context)?;
    next_unit(env, &scanner, Some(context))
}

fn next_unit<'a>(
    env: Env<'a>,
    scanner: &ScannerRef,
    context: Option<Context>,
) -> NifResult<Term<'a>> {
    let mut inner = scanner.lock().map_err(|e| rustler::Error::Term(Box::new(e)))?;
    let result = inner.next_unit(context).map_err(ScanError::from);
    result_to_term(env, result, |unit| unit_to_term(env, &unit))
}

/// `{context, depth, in_dtd, delimiter}`; `delimiter` is the quote of the
/// most recent quoted value, or `nil`
#[rustler::nif]
fn scanner_state<'a>(env: Env<'a>, scanner: ScannerRef) -> NifResult<Term<'a>> {
    let inner = scanner.lock().map_err(|e| rustler::Error::Term(Box::new(e)))?;
    let context = context_to_term(env, inner.context())?;
    let delimiter = match inner.string_delimiter() {
        Some(quote) => term::str_to_binary(env, quote.encode_utf8(&mut [0; 4])),
        None => rustler::types::atom::nil().encode(env),
    };
    Ok((context, inner.depth(), inner.in_dtd(), delimiter).encode(env))
}

/// Move the scanner to `context` at element `depth`
#[rustler::nif]
fn scanner_set_context<'a>(
    env: Env<'a>,
    scanner: ScannerRef,
    context: Term<'a>,
    depth: usize,
) -> NifResult<Term<'a>> {
    let context = term_to_context(context)?;
    let mut inner = scanner.lock().map_err(|e| rustler::Error::Term(Box::new(e)))?;
    inner.set_context(context);
    inner.set_depth(depth);
    Ok(term::ok().encode(env))
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.XmlScan.Native");
