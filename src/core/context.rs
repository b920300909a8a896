//! Scanning contexts
//!
//! The scanner is always in exactly one context, which selects the routine
//! that recognizes the next lexical unit.

/// Structural location of the scanner in the XML grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Before anything was read
    DocumentStart,
    /// Prolog and trailing misc, outside the root element
    TopLevel,
    /// Inside a processing instruction
    PI,
    StartTag,
    DQuotedAttribute,
    SQuotedAttribute,
    /// Element content
    Content,
    EndTag,
    CDataSection,
    /// Inside '<?xml ... ?>'
    XmlDecl,
    Doctype,
    /// Internal DTD subset
    DTDDeclarations,
    ElementDeclaration,
    Attlist,
    Notation,
    Entity,
    DQuotedEntityValue,
    SQuotedEntityValue,
    /// 'NOTATION (...)' attribute type
    NotationType,
    /// '(a|b)' attribute type
    Enumeration,
}

impl Context {
    pub const ALL: [Context; 20] = [
        Context::DocumentStart,
        Context::TopLevel,
        Context::PI,
        Context::StartTag,
        Context::DQuotedAttribute,
        Context::SQuotedAttribute,
        Context::Content,
        Context::EndTag,
        Context::CDataSection,
        Context::XmlDecl,
        Context::Doctype,
        Context::DTDDeclarations,
        Context::ElementDeclaration,
        Context::Attlist,
        Context::Notation,
        Context::Entity,
        Context::DQuotedEntityValue,
        Context::SQuotedEntityValue,
        Context::NotationType,
        Context::Enumeration,
    ];

    /// Snake-case name, used for atoms
    pub fn name(self) -> &'static str {
        match self {
            Context::DocumentStart => "document_start",
            Context::TopLevel => "top_level",
            Context::PI => "pi",
            Context::StartTag => "start_tag",
            Context::DQuotedAttribute => "dquoted_attribute",
            Context::SQuotedAttribute => "squoted_attribute",
            Context::Content => "content",
            Context::EndTag => "end_tag",
            Context::CDataSection => "cdata_section",
            Context::XmlDecl => "xml_decl",
            Context::Doctype => "doctype",
            Context::DTDDeclarations => "dtd_declarations",
            Context::ElementDeclaration => "element_declaration",
            Context::Attlist => "attlist",
            Context::Notation => "notation",
            Context::Entity => "entity",
            Context::DQuotedEntityValue => "dquoted_entity_value",
            Context::SQuotedEntityValue => "squoted_entity_value",
            Context::NotationType => "notation_type",
            Context::Enumeration => "enumeration",
        }
    }

    /// Look up a context by its name
    pub fn from_name(name: &str) -> Option<Context> {
        Context::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Quoted attribute context for the given delimiter
    pub(crate) fn quoted_attribute(delimiter: char) -> Context {
        if delimiter == '\'' {
            Context::SQuotedAttribute
        } else {
            Context::DQuotedAttribute
        }
    }

    /// Quoted entity value context for the given delimiter
    pub(crate) fn quoted_entity_value(delimiter: char) -> Context {
        if delimiter == '\'' {
            Context::SQuotedEntityValue
        } else {
            Context::DQuotedEntityValue
        }
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
