//! Context-sensitive XML scanner
//!
//! `DocumentScanner` splits a document into lexical units, one per call to
//! `next_unit`. What a character means depends on where the scanner is in
//! the grammar, so every call dispatches on the current `Context`, and the
//! routine for that context decides the unit, consumes it, and moves to
//! the next context when the unit ends a construct.
//!
//! Two units are deferred: the PI data routine consumes the closing '?>'
//! and the CDATA routine consumes the closing ']]>', and the matching
//! `PIEnd` / `SectionEnd` is returned by the following call without
//! consuming anything.
//!
//! Internal DTD subset routines live in `dtd.rs`.

use std::io::Read;

use tracing::{debug, trace};

use super::context::Context;
use super::encoding;
use super::error::{ErrorKind, LexicalError, Result, ScanError};
use super::input::InputBuffer;
use super::lexical::{unit_text, LexicalKind, LexicalUnit, TextFlags};
use super::unicode::{is_name_char, is_name_start_char, is_xml_space};

/// A reserved word
pub(super) struct Keyword {
    pub text: &'static str,
    pub kind: LexicalKind,
    /// Reported instead of an error when the input does not spell the word
    pub fallback: Option<LexicalKind>,
}

impl Keyword {
    const fn hard(text: &'static str, kind: LexicalKind) -> Self {
        Keyword {
            text,
            kind,
            fallback: None,
        }
    }

    const fn soft(text: &'static str, kind: LexicalKind) -> Self {
        Keyword {
            text,
            kind,
            fallback: Some(LexicalKind::Name),
        }
    }
}

pub(super) const DOCTYPE: Keyword = Keyword::hard("DOCTYPE", LexicalKind::DoctypeStart);
pub(super) const CDATA_START: Keyword = Keyword::hard("[CDATA[", LexicalKind::CDataStart);
pub(super) const ELEMENT: Keyword = Keyword::hard("ELEMENT", LexicalKind::ElementDeclarationStart);
pub(super) const ATTLIST: Keyword = Keyword::hard("ATTLIST", LexicalKind::AttlistStart);
pub(super) const ENTITY: Keyword = Keyword::hard("ENTITY", LexicalKind::EntityStart);
pub(super) const NOTATION: Keyword = Keyword::hard("NOTATION", LexicalKind::NotationStart);
pub(super) const PCDATA: Keyword = Keyword::hard("#PCDATA", LexicalKind::PCDataIdentifier);
pub(super) const REQUIRED: Keyword = Keyword::hard("#REQUIRED", LexicalKind::RequiredIdentifier);
pub(super) const IMPLIED: Keyword = Keyword::hard("#IMPLIED", LexicalKind::ImpliedIdentifier);
pub(super) const FIXED: Keyword = Keyword::hard("#FIXED", LexicalKind::FixedIdentifier);
const VERSION: Keyword = Keyword::hard("version", LexicalKind::VersionIdentifier);
const ENCODING: Keyword = Keyword::hard("encoding", LexicalKind::EncodingIdentifier);
const STANDALONE: Keyword = Keyword::hard("standalone", LexicalKind::StandaloneIdentifier);
pub(super) const SYSTEM: Keyword = Keyword::soft("SYSTEM", LexicalKind::SystemIdentifier);
pub(super) const PUBLIC: Keyword = Keyword::soft("PUBLIC", LexicalKind::PublicIdentifier);
pub(super) const NDATA: Keyword = Keyword::soft("NDATA", LexicalKind::NDataIdentifier);
pub(super) const EMPTY: Keyword = Keyword::soft("EMPTY", LexicalKind::EmptyIdentifier);
pub(super) const ANY: Keyword = Keyword::soft("ANY", LexicalKind::AnyIdentifier);

/// Pull scanner over one document
pub struct DocumentScanner {
    pub(super) input: InputBuffer,
    pub(super) context: Context,
    pub(super) depth: usize,
    pub(super) in_dtd: bool,
    pub(super) string_delimiter: Option<char>,
    pub(super) pi_end_read: bool,
    pub(super) cdata_end_read: bool,
    // Per-call text flags
    pub(super) last_fragment: bool,
    pub(super) padded_comment: bool,
}

impl DocumentScanner {
    /// Create a scanner positioned at the start of a document
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_context(text, Context::DocumentStart)
    }

    /// Create a scanner that starts in the given context
    pub fn with_context(text: impl Into<String>, context: Context) -> Self {
        DocumentScanner {
            input: InputBuffer::new(text),
            context,
            depth: 0,
            in_dtd: false,
            string_delimiter: None,
            pi_end_read: false,
            cdata_end_read: false,
            last_fragment: false,
            padded_comment: false,
        }
    }

    /// Create a scanner over raw bytes, decoding UTF-8 or UTF-16
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, ScanError> {
        Ok(Self::new(encoding::decode(bytes)?))
    }

    /// Create a scanner over everything the reader yields
    pub fn from_reader<R: Read>(mut reader: R) -> std::result::Result<Self, ScanError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    #[inline]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Move to another context. The deferred '?>' and ']]>' are dropped.
    pub fn set_context(&mut self, context: Context) {
        self.pi_end_read = false;
        self.cdata_end_read = false;
        self.enter(context);
    }

    /// Element nesting depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Check if the scanner is inside the internal DTD subset
    #[inline]
    pub fn in_dtd(&self) -> bool {
        self.in_dtd
    }

    /// Quote character of the most recent quoted value
    #[inline]
    pub fn string_delimiter(&self) -> Option<char> {
        self.string_delimiter
    }

    #[inline]
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Scan the next lexical unit.
    ///
    /// `context` overrides the current context for this call only; the
    /// transitions made while scanning still update the scanner.
    pub fn next_unit(&mut self, context: Option<Context>) -> Result<LexicalUnit> {
        let context = context.unwrap_or(self.context);
        self.last_fragment = false;
        self.padded_comment = false;

        let start = self.input.offset();
        self.input.set_mark();

        let kind = match context {
            Context::DocumentStart => self.next_in_document_start(),
            Context::TopLevel => self.next_in_top_level(),
            Context::PI => self.next_in_pi(),
            Context::StartTag => self.next_in_start_tag(),
            Context::DQuotedAttribute => self.next_in_attribute_value('"'),
            Context::SQuotedAttribute => self.next_in_attribute_value('\''),
            Context::Content => self.next_in_content(),
            Context::EndTag => self.next_in_end_tag(),
            Context::CDataSection => self.next_in_cdata_section(),
            Context::XmlDecl => self.next_in_xml_decl(),
            Context::Doctype => self.next_in_doctype(),
            Context::DTDDeclarations => self.next_in_dtd_declarations(),
            Context::ElementDeclaration => self.next_in_element_declaration(),
            Context::Attlist => self.next_in_attlist(),
            Context::Notation => self.next_in_notation(),
            Context::Entity => self.next_in_entity(),
            Context::DQuotedEntityValue => self.next_in_entity_value('"'),
            Context::SQuotedEntityValue => self.next_in_entity_value('\''),
            Context::NotationType => self.next_in_notation_type(),
            Context::Enumeration => self.next_in_enumeration(),
        }?;

        let flags = TextFlags {
            last_fragment: self.last_fragment,
            cdata_end: context == Context::CDataSection && kind == LexicalKind::CharacterData,
            padded_comment: self.padded_comment,
        };
        let mut raw = String::new();
        if kind.fixed_text().is_none() {
            self.input.read_content(&mut raw);
        }
        trace!(kind = kind.name(), chars = self.input.content_size(), "unit");
        self.input.unset_mark();

        let text = unit_text(kind, raw, flags);
        let position = self.input.last_position();

        Ok(LexicalUnit {
            kind,
            text,
            line: position.line,
            column: position.column,
            span: start..self.input.offset(),
            last_fragment: self.last_fragment,
        })
    }

    // ========================================================================
    // Document structure
    // ========================================================================

    fn next_in_document_start(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => {
                self.enter(Context::TopLevel);
                Ok(self.read_space())
            }
            Some('<') => match self.input.next() {
                Some('?') => {
                    self.input.next();
                    self.read_pi_start(true)
                }
                Some('!') => match self.input.next() {
                    Some('-') => {
                        let kind = self.read_comment()?;
                        self.enter(Context::TopLevel);
                        Ok(kind)
                    }
                    Some('D') => self.read_doctype_start(),
                    None => Err(self.error(ErrorKind::Eof)),
                    Some(_) => Err(self.error(ErrorKind::CommentOrDoctype)),
                },
                _ => self.read_start_tag(),
            },
            None => Err(self.error(ErrorKind::Eof)),
            Some(_) => Err(self.error(ErrorKind::Character)),
        }
    }

    fn next_in_top_level(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('<') => match self.input.next() {
                Some('?') => {
                    self.input.next();
                    self.read_pi_start(false)
                }
                Some('!') => match self.input.next() {
                    Some('-') => self.read_comment(),
                    Some('D') => self.read_doctype_start(),
                    _ => Err(self.unexpected()),
                },
                _ => self.read_start_tag(),
            },
            None => Ok(LexicalKind::Eof),
            Some(_) => Err(self.error(ErrorKind::Character)),
        }
    }

    fn next_in_content(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            None => Ok(LexicalKind::Eof),
            Some('&') => self.read_reference(),
            Some('<') => match self.input.next() {
                Some('?') => {
                    self.input.next();
                    self.read_pi_start(false)
                }
                Some('!') => match self.input.next() {
                    Some('-') => self.read_comment(),
                    Some('[') => {
                        let kind = self.read_keyword(&CDATA_START, 1)?;
                        self.enter(Context::CDataSection);
                        Ok(kind)
                    }
                    _ => Err(self.unexpected()),
                },
                Some('/') => {
                    self.input.next();
                    self.read_name(LexicalKind::EndTag)?;
                    self.enter(Context::EndTag);
                    Ok(LexicalKind::EndTag)
                }
                _ => self.read_start_tag(),
            },
            Some(_) => {
                self.input.skip_until2(b'<', b'&');
                Ok(LexicalKind::CharacterData)
            }
        }
    }

    /// '<' has been read
    fn read_start_tag(&mut self) -> Result<LexicalKind> {
        self.read_name(LexicalKind::StartTag)?;
        self.depth += 1;
        self.enter(Context::StartTag);
        Ok(LexicalKind::StartTag)
    }

    /// '<!' has been read, the lookahead is 'D'
    fn read_doctype_start(&mut self) -> Result<LexicalKind> {
        let kind = self.read_keyword(&DOCTYPE, 1)?;
        self.enter(Context::Doctype);
        Ok(kind)
    }

    fn next_in_start_tag(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('/') => {
                if self.input.next() != Some('>') {
                    return Err(self.error(ErrorKind::TagEnd));
                }
                self.close_element()?;
                self.input.next();
                Ok(LexicalKind::EmptyElementEnd)
            }
            Some('>') => {
                self.input.next();
                self.enter(Context::Content);
                Ok(LexicalKind::EndChar)
            }
            Some('=') => {
                self.input.next();
                Ok(LexicalKind::Eq)
            }
            Some(quote @ ('"' | '\'')) => {
                self.open_quote(quote);
                self.read_attribute_fragment(quote)
            }
            _ => self.read_name(LexicalKind::Name),
        }
    }

    fn next_in_attribute_value(&mut self, delimiter: char) -> Result<LexicalKind> {
        match self.input.current() {
            None => Err(self.error(ErrorKind::Eof)),
            Some('&') => self.read_reference(),
            Some(_) => self.read_attribute_fragment(delimiter),
        }
    }

    /// Scan an attribute value fragment up to the closing quote or a
    /// reference
    pub(super) fn read_attribute_fragment(&mut self, delimiter: char) -> Result<LexicalKind> {
        // Quote characters are ASCII
        match self.input.skip_until3(delimiter as u8, b'&', b'<') {
            None => Err(self.error(ErrorKind::Eof)),
            Some('<') => Err(self.error(ErrorKind::Character)),
            Some('&') => {
                self.enter(Context::quoted_attribute(delimiter));
                Ok(LexicalKind::StringFragment)
            }
            Some(_) => {
                self.input.next();
                self.last_fragment = true;
                let owner = if self.in_dtd {
                    Context::Attlist
                } else {
                    Context::StartTag
                };
                self.enter(owner);
                Ok(LexicalKind::StringFragment)
            }
        }
    }

    fn next_in_end_tag(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => {
                self.close_element()?;
                self.input.next();
                Ok(LexicalKind::EndChar)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Leave the current element
    fn close_element(&mut self) -> Result<()> {
        self.depth = match self.depth.checked_sub(1) {
            Some(depth) => depth,
            None => return Err(self.error(ErrorKind::EndTag)),
        };
        self.enter(self.after_markup());
        Ok(())
    }

    /// Context after markup that closes in element content
    fn after_markup(&self) -> Context {
        if self.depth == 0 {
            Context::TopLevel
        } else {
            Context::Content
        }
    }

    fn next_in_cdata_section(&mut self) -> Result<LexicalKind> {
        if self.cdata_end_read {
            self.cdata_end_read = false;
            self.enter(Context::Content);
            return Ok(LexicalKind::SectionEnd);
        }

        loop {
            if self.input.skip_until(b']').is_none() {
                return Err(self.error(ErrorKind::Eof));
            }
            if self.input.next() != Some(']') {
                continue;
            }
            // A run of ']' may end with ']]>'
            while self.input.next() == Some(']') {}
            if self.input.current() == Some('>') {
                break;
            }
        }
        self.input.next();
        self.cdata_end_read = true;
        Ok(LexicalKind::CharacterData)
    }

    // ========================================================================
    // Processing instructions and the XML declaration
    // ========================================================================

    /// '<?' has been read. At document start, a target spelled 'xml'
    /// opens the XML declaration.
    pub(super) fn read_pi_start(&mut self, document_start: bool) -> Result<LexicalKind> {
        self.input.set_mark();
        match self.input.current() {
            None => return Err(self.error(ErrorKind::Eof)),
            Some(c) if !is_name_start_char(c) => return Err(self.error(ErrorKind::PITarget)),
            Some(_) => {}
        }
        self.input.next();
        self.skip_name_chars();

        let (reserved, declaration) = {
            let target = self.input.content();
            let reserved = target.len() == 3 && target.eq_ignore_ascii_case("xml");
            (reserved, reserved && target == "xml")
        };
        if reserved {
            if document_start && declaration {
                self.enter(Context::XmlDecl);
                return Ok(LexicalKind::XmlDeclStart);
            }
            return Err(self.error(ErrorKind::XmlReserved));
        }
        self.enter(Context::PI);
        Ok(LexicalKind::PIStart)
    }

    fn next_in_pi(&mut self) -> Result<LexicalKind> {
        if self.pi_end_read {
            self.pi_end_read = false;
            self.enter(self.after_pi());
            return Ok(LexicalKind::PIEnd);
        }

        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('?') => {
                if self.input.next() != Some('>') {
                    return Err(self.error(ErrorKind::PIEnd));
                }
                self.input.next();
                self.enter(self.after_pi());
                Ok(LexicalKind::PIEnd)
            }
            None => Err(self.error(ErrorKind::Eof)),
            Some(_) => {
                loop {
                    if self.input.skip_until(b'?').is_none() {
                        return Err(self.error(ErrorKind::Eof));
                    }
                    if self.input.next() == Some('>') {
                        break;
                    }
                }
                self.input.next();
                self.pi_end_read = true;
                Ok(LexicalKind::PIData)
            }
        }
    }

    fn after_pi(&self) -> Context {
        if self.in_dtd {
            Context::DTDDeclarations
        } else {
            self.after_markup()
        }
    }

    fn next_in_xml_decl(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('v') => self.read_keyword(&VERSION, 1),
            Some('e') => self.read_keyword(&ENCODING, 1),
            Some('s') => self.read_keyword(&STANDALONE, 1),
            Some('=') => {
                self.input.next();
                Ok(LexicalKind::Eq)
            }
            Some('?') => {
                if self.input.next() != Some('>') {
                    return Err(self.error(ErrorKind::PIEnd));
                }
                self.input.next();
                self.enter(Context::TopLevel);
                Ok(LexicalKind::PIEnd)
            }
            Some('"' | '\'') => self.read_string(),
            _ => Err(self.unexpected()),
        }
    }

    fn next_in_doctype(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => {
                self.input.next();
                self.enter(Context::TopLevel);
                Ok(LexicalKind::EndChar)
            }
            Some('S') => self.read_keyword(&SYSTEM, 1),
            Some('P') => self.read_keyword(&PUBLIC, 1),
            Some('"' | '\'') => self.read_string(),
            Some('[') => {
                self.input.next();
                self.in_dtd = true;
                self.enter(Context::DTDDeclarations);
                Ok(LexicalKind::LSquareBracket)
            }
            _ => self.read_name(LexicalKind::Name),
        }
    }

    // ========================================================================
    // Shared readers
    // ========================================================================

    /// Record the current context switch
    pub(super) fn enter(&mut self, context: Context) {
        if self.context != context {
            trace!(from = %self.context, to = %context, depth = self.depth, "context switch");
            self.context = context;
        }
    }

    /// Error at the lookahead position
    pub(super) fn error(&self, kind: ErrorKind) -> LexicalError {
        let position = self.input.position();
        debug!(
            key = kind.key(),
            line = position.line,
            column = position.column,
            context = %self.context,
            "lexical error"
        );
        LexicalError {
            kind,
            line: position.line,
            column: position.column,
        }
    }

    /// Error for a lookahead that no rule accepts
    pub(super) fn unexpected(&self) -> LexicalError {
        if self.input.is_eof() {
            self.error(ErrorKind::Eof)
        } else {
            self.error(ErrorKind::Character)
        }
    }

    /// Consume a quote that opens a value and start capturing after it
    pub(super) fn open_quote(&mut self, quote: char) {
        self.string_delimiter = Some(quote);
        self.input.next();
        self.input.set_mark();
    }

    pub(super) fn read_space(&mut self) -> LexicalKind {
        while self.input.next().is_some_and(is_xml_space) {}
        LexicalKind::Whitespace
    }

    pub(super) fn skip_name_chars(&mut self) {
        while self.input.current().is_some_and(is_name_char) {
            self.input.next();
        }
    }

    /// Read a name starting at the lookahead. The unit text is the name.
    pub(super) fn read_name(&mut self, kind: LexicalKind) -> Result<LexicalKind> {
        self.input.set_mark();
        match self.input.current() {
            None => return Err(self.error(ErrorKind::Eof)),
            Some(c) if !is_name_start_char(c) => return Err(self.error(ErrorKind::Name)),
            Some(_) => {}
        }
        self.input.next();
        self.skip_name_chars();
        Ok(kind)
    }

    /// Read a reserved word whose first `matched` characters have been
    /// checked; the last of them is the lookahead.
    pub(super) fn read_keyword(&mut self, keyword: &Keyword, matched: usize) -> Result<LexicalKind> {
        for expected in keyword.text.chars().skip(matched) {
            let c = self.input.next();
            if c == Some(expected) {
                continue;
            }
            return match keyword.fallback {
                Some(kind) => {
                    self.skip_name_chars();
                    Ok(kind)
                }
                None if c.is_none() => Err(self.error(ErrorKind::Eof)),
                None => Err(self.error(ErrorKind::Keyword(keyword.text))),
            };
        }
        self.input.next();

        // 'SYSTEMS' is a name, not a keyword
        if let Some(kind) = keyword.fallback {
            if self.input.current().is_some_and(is_name_char) {
                self.skip_name_chars();
                return Ok(kind);
            }
        }
        Ok(keyword.kind)
    }

    /// Read a quoted literal. The lookahead is the opening quote.
    pub(super) fn read_string(&mut self) -> Result<LexicalKind> {
        let Some(quote) = self.input.current() else {
            return Err(self.error(ErrorKind::Eof));
        };
        self.open_quote(quote);
        if self.input.skip_until(quote as u8).is_none() {
            return Err(self.error(ErrorKind::Eof));
        }
        self.input.next();
        Ok(LexicalKind::StringLiteral)
    }

    /// Read a comment. '<!' has been read, the lookahead is '-'.
    pub(super) fn read_comment(&mut self) -> Result<LexicalKind> {
        if self.input.next() != Some('-') {
            return Err(self.error(ErrorKind::Comment));
        }
        self.input.next();
        self.input.set_mark();

        loop {
            if self.input.skip_until(b'-').is_none() {
                return Err(self.error(ErrorKind::Eof));
            }
            if self.input.next() == Some('-') {
                break;
            }
        }

        // '--' must close the comment, except in '--->'
        match self.input.next() {
            Some('>') => {}
            Some('-') => {
                if self.input.next() != Some('>') {
                    return Err(self.error(ErrorKind::Comment));
                }
                self.padded_comment = true;
            }
            None => return Err(self.error(ErrorKind::Eof)),
            Some(_) => return Err(self.error(ErrorKind::Comment)),
        }
        self.input.next();
        Ok(LexicalKind::Comment)
    }

    /// Read an entity or character reference. The lookahead is '&'.
    pub(super) fn read_reference(&mut self) -> Result<LexicalKind> {
        if self.input.next() != Some('#') {
            self.read_name(LexicalKind::EntityReference)?;
            if self.input.current() != Some(';') {
                return Err(self.error(ErrorKind::EntityReference));
            }
            self.input.next();
            return Ok(LexicalKind::EntityReference);
        }

        self.input.next();
        self.input.set_mark();
        let digits = match self.input.current() {
            None => return Err(self.error(ErrorKind::Eof)),
            Some('x') => {
                self.input.next();
                self.count_while(|c| c.is_ascii_hexdigit())
            }
            Some(_) => self.count_while(|c| c.is_ascii_digit()),
        };
        if digits == 0 || self.input.current() != Some(';') {
            return Err(self.error(ErrorKind::CharacterReference));
        }
        self.input.next();
        Ok(LexicalKind::CharacterReference)
    }

    /// Read a parameter entity reference. The lookahead is '%'.
    pub(super) fn read_pe_reference(&mut self) -> Result<LexicalKind> {
        self.input.next();
        self.input.set_mark();
        match self.input.current() {
            None => return Err(self.error(ErrorKind::Eof)),
            Some(c) if !is_name_start_char(c) => {
                return Err(self.error(ErrorKind::ParameterEntity))
            }
            Some(_) => {}
        }
        self.input.next();
        self.skip_name_chars();
        if self.input.current() != Some(';') {
            return Err(self.error(ErrorKind::ParameterEntity));
        }
        self.input.next();
        Ok(LexicalKind::ParameterEntityReference)
    }

    fn count_while(&mut self, accept: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while self.input.current().is_some_and(&accept) {
            self.input.next();
            count += 1;
        }
        count
    }
}
