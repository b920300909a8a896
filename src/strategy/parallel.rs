//! Parallel Scanning
//!
//! Uses Rayon to tokenize independent documents at once. Each document gets
//! its own scanner; nothing is shared between them.

use rayon::prelude::*;

use super::scan_bytes;
use crate::core::error::ScanError;
use crate::core::lexical::LexicalUnit;

/// Scan multiple documents in parallel, results in input order
pub fn scan_parallel(docs: &[&[u8]]) -> Vec<Result<Vec<LexicalUnit>, ScanError>> {
    docs.par_iter().map(|doc| scan_bytes(doc)).collect()
}
