//! Core scanning primitives
//!
//! - Unicode: XML 1.0 character classes
//! - Input: lookahead buffer with mark/capture and line/column tracking
//! - Lexical: unit kinds and text materialization
//! - Context: the grammar location the scanner is in
//! - Scanner: the context-driven `next_unit` state machine
//! - DTD: internal subset routines of the scanner
//! - Encoding: UTF-16 detection and conversion to UTF-8

pub mod context;
pub mod dtd;
pub mod encoding;
pub mod error;
pub mod input;
pub mod lexical;
pub mod scanner;
pub mod unicode;
