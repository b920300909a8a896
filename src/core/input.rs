//! Input buffer with one character of lookahead
//!
//! The scanner reads through an `InputBuffer`: `current()` is the
//! lookahead, `next()` consumes it. A mark records where the text of the
//! current lexical unit starts; `content()` returns everything consumed
//! since the mark.
//!
//! Line breaks are normalized as XML requires: CR LF and a lone CR are
//! both seen (and captured) as a single '\n'.
//!
//! Delimiter search uses memchr, like the byte scanner this module grew
//! out of, so long runs of character data are skipped in one step.

use memchr::{memchr, memchr2, memchr3};
use std::borrow::Cow;

/// A 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Character buffer over a decoded document
pub struct InputBuffer {
    text: String,
    /// Byte offset of the lookahead character
    pos: usize,
    /// The lookahead character, with line breaks normalized
    current: Option<char>,
    mark: Option<usize>,
    /// Position of the lookahead character
    line: usize,
    column: usize,
    /// Position of the most recently consumed character
    last: Position,
}

impl InputBuffer {
    /// Create a new buffer for the given text
    pub fn new(text: impl Into<String>) -> Self {
        let mut buffer = InputBuffer {
            text: text.into(),
            pos: 0,
            current: None,
            mark: None,
            line: 1,
            column: 1,
            // Nothing consumed yet: just before the first column
            last: Position { line: 1, column: 0 },
        };
        buffer.current = buffer.decode_at(0);
        buffer
    }

    /// The lookahead character, or None at end of input
    #[inline]
    pub fn current(&self) -> Option<char> {
        self.current
    }

    /// Consume the lookahead character and return the new one
    pub fn next(&mut self) -> Option<char> {
        let raw = self.text[self.pos..].chars().next()?;
        let width = if raw == '\r' && self.text.as_bytes().get(self.pos + 1) == Some(&b'\n') {
            2
        } else {
            raw.len_utf8()
        };
        self.bump(raw == '\r' || raw == '\n');
        self.pos += width;
        self.current = self.decode_at(self.pos);
        self.current
    }

    /// Check if the whole input has been consumed
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// Skip forward to the next occurrence of `stop`, without consuming it
    #[inline]
    pub fn skip_until(&mut self, stop: u8) -> Option<char> {
        let found = memchr(stop, self.remaining());
        self.skip_found(found)
    }

    /// Skip forward to the next occurrence of either byte
    #[inline]
    pub fn skip_until2(&mut self, a: u8, b: u8) -> Option<char> {
        let found = memchr2(a, b, self.remaining());
        self.skip_found(found)
    }

    /// Skip forward to the next occurrence of any of three bytes
    #[inline]
    pub fn skip_until3(&mut self, a: u8, b: u8, c: u8) -> Option<char> {
        let found = memchr3(a, b, c, self.remaining());
        self.skip_found(found)
    }

    /// Start capturing at the lookahead character. Calling it again
    /// restarts the capture.
    #[inline]
    pub fn set_mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Stop capturing
    #[inline]
    pub fn unset_mark(&mut self) {
        self.mark = None;
    }

    /// Text consumed since the mark, line breaks normalized
    pub fn content(&self) -> Cow<'_, str> {
        let start = self.mark.unwrap_or(self.pos);
        normalize_newlines(&self.text[start..self.pos])
    }

    /// Number of characters consumed since the mark
    pub fn content_size(&self) -> usize {
        self.content().chars().count()
    }

    /// Append the text consumed since the mark to `buf`
    pub fn read_content(&self, buf: &mut String) {
        buf.push_str(&self.content());
    }

    /// Byte offset of the lookahead character
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Line of the most recently consumed character
    #[inline]
    pub fn line(&self) -> usize {
        self.last.line
    }

    /// Column of the most recently consumed character
    #[inline]
    pub fn column(&self) -> usize {
        self.last.column
    }

    /// Position of the most recently consumed character
    #[inline]
    pub fn last_position(&self) -> Position {
        self.last
    }

    /// Position of the lookahead character
    #[inline]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// The whole decoded document
    #[inline]
    pub fn source(&self) -> &str {
        &self.text
    }

    #[inline]
    fn remaining(&self) -> &[u8] {
        &self.text.as_bytes()[self.pos..]
    }

    fn decode_at(&self, pos: usize) -> Option<char> {
        match self.text[pos..].chars().next() {
            Some('\r') => Some('\n'),
            c => c,
        }
    }

    /// Account for one consumed character
    #[inline]
    fn bump(&mut self, newline: bool) {
        self.last = Position {
            line: self.line,
            column: self.column,
        };
        if newline {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn skip_found(&mut self, found: Option<usize>) -> Option<char> {
        let end = match found {
            Some(i) => self.pos + i,
            None => self.text.len(),
        };
        self.advance_to(end);
        self.current
    }

    /// Consume everything up to byte offset `end`. `end` must be a char
    /// boundary that does not split a CR LF pair.
    fn advance_to(&mut self, end: usize) {
        let start = self.pos;
        for i in start..end {
            let byte = self.text.as_bytes()[i];
            let after_cr = i > start && self.text.as_bytes()[i - 1] == b'\r';
            match byte {
                b'\n' if after_cr => {}
                b'\n' | b'\r' => self.bump(true),
                // Count characters, not UTF-8 continuation bytes
                b if b & 0xC0 != 0x80 => self.bump(false),
                _ => {}
            }
        }
        self.pos = end;
        self.current = self.decode_at(end);
    }
}

/// Replace CR LF and lone CR by LF
pub fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if memchr(b'\r', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
