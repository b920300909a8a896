//! Elixir Term Conversion Utilities
//!
//! Converts lexical units, contexts and scan errors to Elixir terms.

use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};

use crate::core::context::Context;
use crate::core::error::{LexicalError, ScanError};
use crate::core::lexical::{LexicalKind, LexicalUnit};

rustler::atoms! {
    ok,
    error,
    encoding,
    io,
    last_string_fragment,
}

/// Convert a unit to `{kind, text, line, column}`
pub fn unit_to_term<'a>(env: Env<'a>, unit: &LexicalUnit) -> NifResult<Term<'a>> {
    let kind = if unit.kind == LexicalKind::StringFragment && unit.last_fragment {
        last_string_fragment()
    } else {
        Atom::from_str(env, unit.kind.name())?
    };
    Ok((kind, str_to_binary(env, &unit.text), unit.line, unit.column).encode(env))
}

/// Convert units to a list, building in reverse
pub fn units_to_term<'a>(env: Env<'a>, units: &[LexicalUnit]) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for unit in units.iter().rev() {
        list = list.list_prepend(unit_to_term(env, unit)?);
    }
    Ok(list)
}

/// `{key, message, line, column}`
pub fn lexical_error_to_term<'a>(env: Env<'a>, err: &LexicalError) -> NifResult<Term<'a>> {
    let key = Atom::from_str(env, err.key())?;
    Ok((key, str_to_binary(env, &err.message()), err.line, err.column).encode(env))
}

/// Reason term for any scan failure
pub fn scan_error_to_term<'a>(env: Env<'a>, err: &ScanError) -> NifResult<Term<'a>> {
    match err {
        ScanError::Lexical(e) => lexical_error_to_term(env, e),
        ScanError::Encoding(msg) => Ok((encoding(), str_to_binary(env, msg)).encode(env)),
        ScanError::Io(e) => Ok((io(), str_to_binary(env, &e.to_string())).encode(env)),
    }
}

/// `{:ok, value}` or `{:error, reason}` for a scan result
pub fn result_to_term<'a, T, F>(
    env: Env<'a>,
    result: Result<T, ScanError>,
    on_ok: F,
) -> NifResult<Term<'a>>
where
    F: FnOnce(T) -> NifResult<Term<'a>>,
{
    match result {
        Ok(value) => Ok((ok(), on_ok(value)?).encode(env)),
        Err(e) => Ok((error(), scan_error_to_term(env, &e)?).encode(env)),
    }
}

#[inline]
pub fn context_to_term<'a>(env: Env<'a>, context: Context) -> NifResult<Term<'a>> {
    Ok(Atom::from_str(env, context.name())?.encode(env))
}

/// Read a context atom, `badarg` for anything else
pub fn term_to_context(term: Term<'_>) -> NifResult<Context> {
    let name = term.atom_to_string()?;
    Context::from_name(&name).ok_or(rustler::Error::BadArg)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
