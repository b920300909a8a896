//! Scanner errors
//!
//! Every lexical error is fatal: the scanner raises it at the point of
//! detection and does not try to recover.

use thiserror::Error;

/// What went wrong, keyed by a stable message key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input
    Eof,
    /// Character not allowed here
    Character,
    /// Character cannot start a name
    Name,
    /// Malformed comment, or '--' inside a comment body
    Comment,
    /// '<!' at document start not followed by '--' or 'DOCTYPE'
    CommentOrDoctype,
    CharacterReference,
    EntityReference,
    ParameterEntity,
    /// Bad first character of a PI target
    PITarget,
    /// '?' not followed by '>'
    PIEnd,
    /// Target matching 'xml' outside the XML declaration
    XmlReserved,
    /// '/' not followed by '>'
    TagEnd,
    /// End tag without a matching start tag
    EndTag,
    /// A reserved word did not match
    Keyword(&'static str),
}

impl ErrorKind {
    /// Stable message key
    pub fn key(self) -> &'static str {
        match self {
            ErrorKind::Eof => "eof",
            ErrorKind::Character => "character",
            ErrorKind::Name => "name",
            ErrorKind::Comment => "comment",
            ErrorKind::CommentOrDoctype => "comment.or.doctype",
            ErrorKind::CharacterReference => "character.reference",
            ErrorKind::EntityReference => "entity.reference",
            ErrorKind::ParameterEntity => "parameter.entity",
            ErrorKind::PITarget => "pi.target",
            ErrorKind::PIEnd => "pi.end",
            ErrorKind::XmlReserved => "xml.reserved",
            ErrorKind::TagEnd => "tag.end",
            ErrorKind::EndTag => "end.tag",
            ErrorKind::Keyword(_) => "keyword",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Eof => f.write_str("Unexpected end of file"),
            ErrorKind::Character => f.write_str("Unexpected character"),
            ErrorKind::Name => f.write_str("Invalid name start character"),
            ErrorKind::Comment => f.write_str("Malformed comment"),
            ErrorKind::CommentOrDoctype => f.write_str("Expected a comment or a DOCTYPE declaration"),
            ErrorKind::CharacterReference => f.write_str("Malformed character reference"),
            ErrorKind::EntityReference => f.write_str("Malformed entity reference"),
            ErrorKind::ParameterEntity => f.write_str("Malformed parameter entity reference"),
            ErrorKind::PITarget => f.write_str("Invalid processing instruction target"),
            ErrorKind::PIEnd => f.write_str("Expected '?>'"),
            ErrorKind::XmlReserved => f.write_str("Processing instruction target 'xml' is reserved"),
            ErrorKind::TagEnd => f.write_str("Expected '/>'"),
            ErrorKind::EndTag => f.write_str("End tag without matching start tag"),
            ErrorKind::Keyword(word) => write!(f, "Expected '{}'", word),
        }
    }
}

/// A lexical error at a 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct LexicalError {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
}

impl LexicalError {
    #[inline]
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// English message without the position
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Errors raised by the scanner front doors
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    /// The input bytes could not be decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, LexicalError>;
