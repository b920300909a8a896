//! Scanning Strategies
//!
//! - Whole document: drain a scanner to EOF and collect the units
//! - Parallel: scan independent documents on the rayon pool
//!
//! A pull scanner kept alive across calls lives in `resource`.

pub mod parallel;

pub use parallel::scan_parallel;

use tracing::debug;

use crate::core::encoding;
use crate::core::error::{LexicalError, ScanError};
use crate::core::lexical::LexicalUnit;
use crate::core::scanner::DocumentScanner;

/// Scan a document to EOF. The EOF unit is not included.
///
/// This tokenizes only: an unclosed element ends the scan without error,
/// with `depth()` still above zero.
pub fn scan_document(text: impl Into<String>) -> Result<Vec<LexicalUnit>, LexicalError> {
    drain(DocumentScanner::new(text))
}

/// Decode raw bytes and scan the document to EOF
pub fn scan_bytes(bytes: &[u8]) -> Result<Vec<LexicalUnit>, ScanError> {
    let text = encoding::decode(bytes)?;
    Ok(scan_document(text)?)
}

fn drain(mut scanner: DocumentScanner) -> Result<Vec<LexicalUnit>, LexicalError> {
    debug!(bytes = scanner.input().source().len(), "scan start");
    let mut units = Vec::new();
    loop {
        let unit = scanner.next_unit(None)?;
        if unit.is_eof() {
            break;
        }
        units.push(unit);
    }
    debug!(units = units.len(), depth = scanner.depth(), "scan done");
    Ok(units)
}
