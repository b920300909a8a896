//! ResourceArc Wrappers
//!
//! Persistent state for a pull scanner driven from the BEAM.

use crate::core::error::ScanError;
use crate::core::scanner::DocumentScanner;
use rustler::ResourceArc;
use std::io::Read;
use std::sync::{Mutex, MutexGuard};

/// Wrapper for DocumentScanner that can be stored in a ResourceArc
pub struct ScannerResource {
    pub inner: Mutex<DocumentScanner>,
}

impl ScannerResource {
    /// Read and decode a document and start a scanner at document start
    pub fn new<R: Read>(input: R) -> Result<Self, ScanError> {
        Ok(ScannerResource {
            inner: Mutex::new(DocumentScanner::from_reader(input)?),
        })
    }

    /// Lock the scanner.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, DocumentScanner>, &'static str> {
        self.inner.lock().map_err(|_| "mutex_poisoned")
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ScannerResource {}

/// Type alias for the ResourceArc
pub type ScannerRef = ResourceArc<ScannerResource>;
