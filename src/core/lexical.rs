//! Lexical units
//!
//! The scanner produces one `LexicalUnit` per call. The text of a unit is
//! derived from the span captured since the mark by a fixed per-kind
//! rule: kinds with a constant spelling report that spelling, the others
//! report the captured span minus the closing delimiter that the scanner
//! consumed along with it.

use std::borrow::Cow;
use std::ops::Range;

/// Type of a lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalKind {
    Eof,
    /// White space (S)
    Whitespace,
    /// '<Name'
    StartTag,
    /// '<?Name'
    PIStart,
    /// '<?xml'
    XmlDeclStart,
    PIData,
    /// '?>'
    PIEnd,
    Comment,
    /// '<!DOCTYPE'
    DoctypeStart,
    /// '/>'
    EmptyElementEnd,
    /// '>'
    EndChar,
    Name,
    /// '='
    Eq,
    /// A piece of an attribute or entity value
    StringFragment,
    /// '&Name;'
    EntityReference,
    /// '&#...;'
    CharacterReference,
    CharacterData,
    /// '</Name'
    EndTag,
    /// '<![CDATA['
    CDataStart,
    /// ']]>'
    SectionEnd,
    VersionIdentifier,
    EncodingIdentifier,
    StandaloneIdentifier,
    /// A quoted literal (version, encoding, system/public id)
    StringLiteral,
    SystemIdentifier,
    PublicIdentifier,
    LSquareBracket,
    RSquareBracket,
    /// '%Name;'
    ParameterEntityReference,
    /// '<!ELEMENT'
    ElementDeclarationStart,
    /// '<!ATTLIST'
    AttlistStart,
    /// '<!ENTITY'
    EntityStart,
    /// '<!NOTATION'
    NotationStart,
    Percent,
    NDataIdentifier,
    EmptyIdentifier,
    AnyIdentifier,
    Question,
    Plus,
    Star,
    LeftBrace,
    RightBrace,
    Pipe,
    Comma,
    PCDataIdentifier,
    CDataIdentifier,
    IdIdentifier,
    IdrefIdentifier,
    IdrefsIdentifier,
    NmtokenIdentifier,
    NmtokensIdentifier,
    EntityIdentifier,
    EntitiesIdentifier,
    RequiredIdentifier,
    ImpliedIdentifier,
    FixedIdentifier,
    Nmtoken,
    NotationIdentifier,
}

impl LexicalKind {
    /// The constant spelling of this kind, if it has one
    pub fn fixed_text(self) -> Option<&'static str> {
        use LexicalKind::*;
        let text = match self {
            Eof => "",
            PIEnd => "?>",
            DoctypeStart => "<!DOCTYPE",
            EmptyElementEnd => "/>",
            EndChar => ">",
            Eq => "=",
            CDataStart => "<![CDATA[",
            SectionEnd => "]]>",
            VersionIdentifier => "version",
            EncodingIdentifier => "encoding",
            StandaloneIdentifier => "standalone",
            SystemIdentifier => "SYSTEM",
            PublicIdentifier => "PUBLIC",
            LSquareBracket => "[",
            RSquareBracket => "]",
            ElementDeclarationStart => "<!ELEMENT",
            AttlistStart => "<!ATTLIST",
            EntityStart => "<!ENTITY",
            NotationStart => "<!NOTATION",
            Percent => "%",
            NDataIdentifier => "NDATA",
            EmptyIdentifier => "EMPTY",
            AnyIdentifier => "ANY",
            Question => "?",
            Plus => "+",
            Star => "*",
            LeftBrace => "(",
            RightBrace => ")",
            Pipe => "|",
            Comma => ",",
            PCDataIdentifier => "#PCDATA",
            CDataIdentifier => "CDATA",
            IdIdentifier => "ID",
            IdrefIdentifier => "IDREF",
            IdrefsIdentifier => "IDREFS",
            NmtokenIdentifier => "NMTOKEN",
            NmtokensIdentifier => "NMTOKENS",
            EntityIdentifier => "ENTITY",
            EntitiesIdentifier => "ENTITIES",
            RequiredIdentifier => "#REQUIRED",
            ImpliedIdentifier => "#IMPLIED",
            FixedIdentifier => "#FIXED",
            NotationIdentifier => "NOTATION",
            Whitespace | StartTag | PIStart | XmlDeclStart | PIData | Comment | Name
            | StringFragment | EntityReference | CharacterReference | CharacterData | EndTag
            | StringLiteral | ParameterEntityReference | Nmtoken => return None,
        };
        Some(text)
    }

    /// Snake-case name, used for atoms and diagnostics
    pub fn name(self) -> &'static str {
        use LexicalKind::*;
        match self {
            Eof => "eof",
            Whitespace => "s",
            StartTag => "start_tag",
            PIStart => "pi_start",
            XmlDeclStart => "xml_decl_start",
            PIData => "pi_data",
            PIEnd => "pi_end",
            Comment => "comment",
            DoctypeStart => "doctype_start",
            EmptyElementEnd => "empty_element_end",
            EndChar => "end_char",
            Name => "name",
            Eq => "eq",
            StringFragment => "string_fragment",
            EntityReference => "entity_reference",
            CharacterReference => "character_reference",
            CharacterData => "character_data",
            EndTag => "end_tag",
            CDataStart => "cdata_start",
            SectionEnd => "section_end",
            VersionIdentifier => "version_identifier",
            EncodingIdentifier => "encoding_identifier",
            StandaloneIdentifier => "standalone_identifier",
            StringLiteral => "string",
            SystemIdentifier => "system_identifier",
            PublicIdentifier => "public_identifier",
            LSquareBracket => "lsquare_bracket",
            RSquareBracket => "rsquare_bracket",
            ParameterEntityReference => "parameter_entity_reference",
            ElementDeclarationStart => "element_declaration_start",
            AttlistStart => "attlist_start",
            EntityStart => "entity_start",
            NotationStart => "notation_start",
            Percent => "percent",
            NDataIdentifier => "ndata_identifier",
            EmptyIdentifier => "empty_identifier",
            AnyIdentifier => "any_identifier",
            Question => "question",
            Plus => "plus",
            Star => "star",
            LeftBrace => "left_brace",
            RightBrace => "right_brace",
            Pipe => "pipe",
            Comma => "comma",
            PCDataIdentifier => "pcdata_identifier",
            CDataIdentifier => "cdata_identifier",
            IdIdentifier => "id_identifier",
            IdrefIdentifier => "idref_identifier",
            IdrefsIdentifier => "idrefs_identifier",
            NmtokenIdentifier => "nmtoken_identifier",
            NmtokensIdentifier => "nmtokens_identifier",
            EntityIdentifier => "entity_identifier",
            EntitiesIdentifier => "entities_identifier",
            RequiredIdentifier => "required_identifier",
            ImpliedIdentifier => "implied_identifier",
            FixedIdentifier => "fixed_identifier",
            Nmtoken => "nmtoken",
            NotationIdentifier => "notation_identifier",
        }
    }
}

/// Closing-delimiter state of the unit just scanned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextFlags {
    /// The closing quote of a value was consumed with this fragment
    pub last_fragment: bool,
    /// ']]>' was consumed with this character data
    pub cdata_end: bool,
    /// The comment body ended in '-' right before '-->'
    pub padded_comment: bool,
}

/// Number of trailing delimiter characters captured with a unit of `kind`
/// that are not part of its text
pub fn trailing_delimiter_len(kind: LexicalKind, flags: TextFlags) -> usize {
    match kind {
        LexicalKind::StringLiteral
        | LexicalKind::EntityReference
        | LexicalKind::CharacterReference
        | LexicalKind::ParameterEntityReference => 1,
        LexicalKind::PIData => 2,
        LexicalKind::Comment => 3,
        LexicalKind::StringFragment if flags.last_fragment => 1,
        LexicalKind::CharacterData if flags.cdata_end => 3,
        _ => 0,
    }
}

/// Text of a unit of `kind` given the span captured since the mark.
/// The delimiters are stripped in place.
pub fn unit_text(kind: LexicalKind, mut raw: String, flags: TextFlags) -> Cow<'static, str> {
    if let Some(fixed) = kind.fixed_text() {
        return Cow::Borrowed(fixed);
    }
    // Stripped delimiters are ASCII, so this is a char boundary
    let end = raw.len().saturating_sub(trailing_delimiter_len(kind, flags));
    raw.truncate(end);
    if kind == LexicalKind::Comment && flags.padded_comment {
        raw.push(' ');
    }
    Cow::Owned(raw)
}

/// A lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalUnit {
    pub kind: LexicalKind,
    pub text: Cow<'static, str>,
    /// Line of the last character consumed for this unit
    pub line: usize,
    /// Column of the last character consumed for this unit
    pub column: usize,
    /// Byte range of the input consumed by this unit, delimiters included
    pub span: Range<usize>,
    /// Set on the string fragment that closes a quoted value
    pub last_fragment: bool,
}

impl LexicalUnit {
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == LexicalKind::Eof
    }
}
