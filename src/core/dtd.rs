//! Internal DTD subset
//!
//! Scanning routines for the contexts between '[' and ']' of a DOCTYPE:
//! markup declarations, their quoted values and the two parenthesized
//! attribute types. Declarations are tokenized only; content models and
//! attribute defaults are not checked.

use super::context::Context;
use super::error::{ErrorKind, Result};
use super::lexical::LexicalKind;
use super::scanner::{
    DocumentScanner, ANY, ATTLIST, ELEMENT, EMPTY, ENTITY, FIXED, IMPLIED, NDATA, NOTATION,
    PCDATA, PUBLIC, REQUIRED, SYSTEM,
};
use super::unicode::{is_name_char, is_xml_space};

/// Attribute types, matched against a whole name
const ATTRIBUTE_TYPES: [(&str, LexicalKind); 9] = [
    ("CDATA", LexicalKind::CDataIdentifier),
    ("ID", LexicalKind::IdIdentifier),
    ("IDREF", LexicalKind::IdrefIdentifier),
    ("IDREFS", LexicalKind::IdrefsIdentifier),
    ("NMTOKEN", LexicalKind::NmtokenIdentifier),
    ("NMTOKENS", LexicalKind::NmtokensIdentifier),
    ("ENTITY", LexicalKind::EntityIdentifier),
    ("ENTITIES", LexicalKind::EntitiesIdentifier),
    ("NOTATION", LexicalKind::NotationIdentifier),
];

impl DocumentScanner {
    pub(super) fn next_in_dtd_declarations(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some(']') => {
                self.input.next();
                self.in_dtd = false;
                self.enter(Context::Doctype);
                Ok(LexicalKind::RSquareBracket)
            }
            Some('%') => self.read_pe_reference(),
            Some('<') => match self.input.next() {
                Some('?') => {
                    self.input.next();
                    self.read_pi_start(false)
                }
                Some('!') => self.read_markup_declaration(),
                _ => Err(self.unexpected()),
            },
            _ => Err(self.unexpected()),
        }
    }

    /// '<' has been read, the lookahead is '!'
    fn read_markup_declaration(&mut self) -> Result<LexicalKind> {
        let (kind, context) = match self.input.next() {
            Some('-') => return self.read_comment(),
            Some('E') => match self.input.next() {
                Some('L') => (self.read_keyword(&ELEMENT, 2)?, Context::ElementDeclaration),
                Some('N') => (self.read_keyword(&ENTITY, 2)?, Context::Entity),
                _ => return Err(self.unexpected()),
            },
            Some('A') => (self.read_keyword(&ATTLIST, 1)?, Context::Attlist),
            Some('N') => (self.read_keyword(&NOTATION, 1)?, Context::Notation),
            _ => return Err(self.unexpected()),
        };
        self.enter(context);
        Ok(kind)
    }

    /// '>' closing a declaration
    fn end_declaration(&mut self) -> LexicalKind {
        self.input.next();
        self.enter(Context::DTDDeclarations);
        LexicalKind::EndChar
    }

    fn punctuation(&mut self, kind: LexicalKind) -> LexicalKind {
        self.input.next();
        kind
    }

    pub(super) fn next_in_element_declaration(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => Ok(self.end_declaration()),
            Some('%') => self.read_pe_reference(),
            Some('E') => self.read_keyword(&EMPTY, 1),
            Some('A') => self.read_keyword(&ANY, 1),
            Some('#') => self.read_keyword(&PCDATA, 1),
            Some('?') => Ok(self.punctuation(LexicalKind::Question)),
            Some('+') => Ok(self.punctuation(LexicalKind::Plus)),
            Some('*') => Ok(self.punctuation(LexicalKind::Star)),
            Some('(') => Ok(self.punctuation(LexicalKind::LeftBrace)),
            Some(')') => Ok(self.punctuation(LexicalKind::RightBrace)),
            Some('|') => Ok(self.punctuation(LexicalKind::Pipe)),
            Some(',') => Ok(self.punctuation(LexicalKind::Comma)),
            _ => self.read_name(LexicalKind::Name),
        }
    }

    pub(super) fn next_in_attlist(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => Ok(self.end_declaration()),
            Some('%') => self.read_pe_reference(),
            Some(quote @ ('"' | '\'')) => {
                self.open_quote(quote);
                self.read_attribute_fragment(quote)
            }
            Some('#') => match self.input.next() {
                Some('R') => self.read_keyword(&REQUIRED, 2),
                Some('I') => self.read_keyword(&IMPLIED, 2),
                Some('F') => self.read_keyword(&FIXED, 2),
                _ => Err(self.unexpected()),
            },
            Some('(') => {
                self.input.next();
                self.enter(Context::Enumeration);
                Ok(LexicalKind::LeftBrace)
            }
            _ => self.read_attribute_type(),
        }
    }

    /// An attribute type keyword, or any other name
    fn read_attribute_type(&mut self) -> Result<LexicalKind> {
        self.read_name(LexicalKind::Name)?;
        let kind = {
            let name = self.input.content();
            ATTRIBUTE_TYPES
                .iter()
                .find(|(text, _)| *text == name)
                .map_or(LexicalKind::Name, |&(_, kind)| kind)
        };
        if kind == LexicalKind::NotationIdentifier {
            self.enter(Context::NotationType);
        }
        Ok(kind)
    }

    pub(super) fn next_in_notation_type(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('|') => Ok(self.punctuation(LexicalKind::Pipe)),
            Some('(') => Ok(self.punctuation(LexicalKind::LeftBrace)),
            Some(')') => {
                self.input.next();
                self.enter(Context::Attlist);
                Ok(LexicalKind::RightBrace)
            }
            _ => self.read_name(LexicalKind::Name),
        }
    }

    pub(super) fn next_in_enumeration(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('|') => Ok(self.punctuation(LexicalKind::Pipe)),
            Some(')') => {
                self.input.next();
                self.enter(Context::Attlist);
                Ok(LexicalKind::RightBrace)
            }
            _ => self.read_nmtoken(),
        }
    }

    /// Read a name token: one or more name characters
    fn read_nmtoken(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            None => Err(self.error(ErrorKind::Eof)),
            Some(c) if !is_name_char(c) => Err(self.error(ErrorKind::Name)),
            Some(_) => {
                self.skip_name_chars();
                Ok(LexicalKind::Nmtoken)
            }
        }
    }

    pub(super) fn next_in_notation(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => Ok(self.end_declaration()),
            Some('%') => self.read_pe_reference(),
            Some('S') => self.read_keyword(&SYSTEM, 1),
            Some('P') => self.read_keyword(&PUBLIC, 1),
            Some('"' | '\'') => self.read_string(),
            _ => self.read_name(LexicalKind::Name),
        }
    }

    pub(super) fn next_in_entity(&mut self) -> Result<LexicalKind> {
        match self.input.current() {
            Some(c) if is_xml_space(c) => Ok(self.read_space()),
            Some('>') => Ok(self.end_declaration()),
            Some('%') => Ok(self.punctuation(LexicalKind::Percent)),
            Some('S') => self.read_keyword(&SYSTEM, 1),
            Some('P') => self.read_keyword(&PUBLIC, 1),
            Some('N') => self.read_keyword(&NDATA, 1),
            Some(quote @ ('"' | '\'')) => {
                self.open_quote(quote);
                self.read_entity_fragment(quote)
            }
            _ => self.read_name(LexicalKind::Name),
        }
    }

    pub(super) fn next_in_entity_value(&mut self, delimiter: char) -> Result<LexicalKind> {
        match self.input.current() {
            Some('&') => self.read_reference(),
            Some('%') => self.read_pe_reference(),
            _ => self.read_entity_fragment(delimiter),
        }
    }

    /// Scan an entity value fragment up to the closing quote or a reference
    fn read_entity_fragment(&mut self, delimiter: char) -> Result<LexicalKind> {
        match self.input.skip_until3(delimiter as u8, b'&', b'%') {
            None => Err(self.error(ErrorKind::Eof)),
            Some('&' | '%') => {
                self.enter(Context::quoted_entity_value(delimiter));
                Ok(LexicalKind::StringFragment)
            }
            Some(_) => {
                self.input.next();
                self.last_fragment = true;
                self.enter(Context::Entity);
                Ok(LexicalKind::StringFragment)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::scanner::tests::{kinds, scan, scan_err};
    use super::*;
    use crate::core::lexical::LexicalKind::*;

    /// Scan `decl` inside an internal subset, returning the units between
    /// '[' and ']'
    fn subset(decl: &str) -> Vec<(LexicalKind, String)> {
        let units = scan(&format!("<!DOCTYPE r [{}]><r/>", decl)).unwrap();
        let open = units.iter().position(|(k, _)| *k == LSquareBracket).unwrap();
        let close = units.iter().rposition(|(k, _)| *k == RSquareBracket).unwrap();
        units[open + 1..close].to_vec()
    }

    fn subset_kinds(decl: &str) -> Vec<LexicalKind> {
        subset(decl).into_iter().map(|(k, _)| k).collect()
    }

    fn subset_err(decl: &str) -> ErrorKind {
        scan_err(&format!("<!DOCTYPE r [{}]><r/>", decl)).kind
    }

    fn unit(kind: LexicalKind, text: &str) -> (LexicalKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_doctype_with_subset() {
        assert_eq!(
            kinds("<!DOCTYPE r [ ]>\n<r/>"),
            vec![
                DoctypeStart,
                Whitespace,
                Name,
                Whitespace,
                LSquareBracket,
                Whitespace,
                RSquareBracket,
                EndChar,
                Whitespace,
                StartTag,
                EmptyElementEnd,
            ]
        );
    }

    #[test]
    fn test_element_declaration() {
        assert_eq!(
            subset("<!ELEMENT p (#PCDATA|em)*>"),
            vec![
                unit(ElementDeclarationStart, "<!ELEMENT"),
                unit(Whitespace, " "),
                unit(Name, "p"),
                unit(Whitespace, " "),
                unit(LeftBrace, "("),
                unit(PCDataIdentifier, "#PCDATA"),
                unit(Pipe, "|"),
                unit(Name, "em"),
                unit(RightBrace, ")"),
                unit(Star, "*"),
                unit(EndChar, ">"),
            ]
        );
    }

    #[test]
    fn test_element_content_model_punctuation() {
        assert_eq!(
            subset_kinds("<!ELEMENT a (b?,c+)>"),
            vec![
                ElementDeclarationStart,
                Whitespace,
                Name,
                Whitespace,
                LeftBrace,
                Name,
                Question,
                Comma,
                Name,
                Plus,
                RightBrace,
                EndChar,
            ]
        );
    }

    #[test]
    fn test_element_empty_and_any() {
        let units = subset("<!ELEMENT a EMPTY><!ELEMENT b ANY><!ELEMENT c EMPTYISH><!ELEMENT d E>");
        let named: Vec<_> = units
            .iter()
            .filter(|(k, _)| matches!(k, EmptyIdentifier | AnyIdentifier | Name))
            .cloned()
            .collect();
        assert_eq!(
            named,
            vec![
                unit(Name, "a"),
                unit(EmptyIdentifier, "EMPTY"),
                unit(Name, "b"),
                unit(AnyIdentifier, "ANY"),
                unit(Name, "c"),
                unit(Name, "EMPTYISH"),
                unit(Name, "d"),
                unit(Name, "E"),
            ]
        );
    }

    #[test]
    fn test_element_pcdata_is_hard() {
        assert_eq!(subset_err("<!ELEMENT a (#PCDAT)>"), ErrorKind::Keyword("#PCDATA"));
    }

    #[test]
    fn test_declaration_start_errors() {
        assert_eq!(subset_err("<!ELEMNT a ANY>"), ErrorKind::Keyword("ELEMENT"));
        assert_eq!(subset_err("<!ENTTY a 'x'>"), ErrorKind::Keyword("ENTITY"));
        assert_eq!(subset_err("<!EX a>"), ErrorKind::Character);
        assert_eq!(subset_err("<!ATLIST a>"), ErrorKind::Keyword("ATTLIST"));
        assert_eq!(subset_err("<!NOTATON a>"), ErrorKind::Keyword("NOTATION"));
        assert_eq!(subset_err("<!X>"), ErrorKind::Character);
        assert_eq!(subset_err("x"), ErrorKind::Character);
        assert_eq!(scan_err("<!DOCTYPE r [<!ELEMENT").kind, ErrorKind::Eof);
        assert_eq!(scan_err("<!DOCTYPE r [").kind, ErrorKind::Eof);
    }

    #[test]
    fn test_parameter_entity_references() {
        assert_eq!(
            subset("%ext;<!ELEMENT a %model;>"),
            vec![
                unit(ParameterEntityReference, "ext"),
                unit(ElementDeclarationStart, "<!ELEMENT"),
                unit(Whitespace, " "),
                unit(Name, "a"),
                unit(Whitespace, " "),
                unit(ParameterEntityReference, "model"),
                unit(EndChar, ">"),
            ]
        );
        assert_eq!(subset_err("%ext"), ErrorKind::ParameterEntity);
        assert_eq!(subset_err("% ext;"), ErrorKind::ParameterEntity);
        assert_eq!(subset_err("<!ATTLIST a %b>"), ErrorKind::ParameterEntity);
        assert_eq!(subset_err("<!NOTATION a %b c>"), ErrorKind::ParameterEntity);
    }

    #[test]
    fn test_attlist_declaration() {
        assert_eq!(
            subset("<!ATTLIST a id ID #REQUIRED x CDATA 'd&amp;' y (one|two) \"one\">"),
            vec![
                unit(AttlistStart, "<!ATTLIST"),
                unit(Whitespace, " "),
                unit(Name, "a"),
                unit(Whitespace, " "),
                unit(Name, "id"),
                unit(Whitespace, " "),
                unit(IdIdentifier, "ID"),
                unit(Whitespace, " "),
                unit(RequiredIdentifier, "#REQUIRED"),
                unit(Whitespace, " "),
                unit(Name, "x"),
                unit(Whitespace, " "),
                unit(CDataIdentifier, "CDATA"),
                unit(Whitespace, " "),
                unit(StringFragment, "d"),
                unit(EntityReference, "amp"),
                unit(StringFragment, ""),
                unit(Whitespace, " "),
                unit(Name, "y"),
                unit(Whitespace, " "),
                unit(LeftBrace, "("),
                unit(Nmtoken, "one"),
                unit(Pipe, "|"),
                unit(Nmtoken, "two"),
                unit(RightBrace, ")"),
                unit(Whitespace, " "),
                unit(StringFragment, "one"),
                unit(EndChar, ">"),
            ]
        );
    }

    #[test]
    fn test_attlist_defaults() {
        assert_eq!(
            subset_kinds("<!ATTLIST a b CDATA #IMPLIED c CDATA #FIXED 'v'>")
                .into_iter()
                .filter(|k| *k != Whitespace)
                .collect::<Vec<_>>(),
            vec![
                AttlistStart,
                Name,
                Name,
                CDataIdentifier,
                ImpliedIdentifier,
                Name,
                CDataIdentifier,
                FixedIdentifier,
                StringFragment,
                EndChar,
            ]
        );
        assert_eq!(subset_err("<!ATTLIST a b CDATA #REQ>"), ErrorKind::Keyword("#REQUIRED"));
        assert_eq!(subset_err("<!ATTLIST a b CDATA #DEFAULT>"), ErrorKind::Character);
        assert_eq!(subset_err("<!ATTLIST a b CDATA 'x<y'>"), ErrorKind::Character);
    }

    /// The unit an attribute type position yields for `word`
    fn attribute_type(word: &str) -> (LexicalKind, String) {
        let units = subset(&format!("<!ATTLIST a b {} #IMPLIED>", word));
        units[6].clone()
    }

    #[test]
    fn test_attribute_type_keywords() {
        for (word, kind) in ATTRIBUTE_TYPES {
            if kind == NotationIdentifier {
                continue;
            }
            assert_eq!(attribute_type(word), unit(kind, word), "{word}");
        }
    }

    #[test]
    fn test_attribute_type_prefixes_are_names() {
        for (word, _) in ATTRIBUTE_TYPES {
            for end in 1..word.len() {
                let prefix = &word[..end];
                // 'ID' is a prefix of 'IDREF', 'IDREF' of 'IDREFS'...
                let expected = ATTRIBUTE_TYPES
                    .iter()
                    .find(|(text, _)| *text == prefix)
                    .map_or(Name, |&(_, k)| k);
                assert_eq!(attribute_type(prefix), unit(expected, prefix), "{word} / {prefix}");
            }
        }
    }

    #[test]
    fn test_attribute_type_extensions_are_names() {
        for (word, _) in ATTRIBUTE_TYPES {
            for extra in ["X", "_", "1", "-"] {
                let extended = format!("{}{}", word, extra);
                assert_eq!(attribute_type(&extended), unit(Name, &extended), "{extended}");
            }
        }
    }

    #[test]
    fn test_notation_type() {
        assert_eq!(
            subset("<!ATTLIST img fmt NOTATION (gif|png) #REQUIRED>"),
            vec![
                unit(AttlistStart, "<!ATTLIST"),
                unit(Whitespace, " "),
                unit(Name, "img"),
                unit(Whitespace, " "),
                unit(Name, "fmt"),
                unit(Whitespace, " "),
                unit(NotationIdentifier, "NOTATION"),
                unit(Whitespace, " "),
                unit(LeftBrace, "("),
                unit(Name, "gif"),
                unit(Pipe, "|"),
                unit(Name, "png"),
                unit(RightBrace, ")"),
                unit(Whitespace, " "),
                unit(RequiredIdentifier, "#REQUIRED"),
                unit(EndChar, ">"),
            ]
        );
    }

    #[test]
    fn test_notation_prefix_does_not_switch_context() {
        // 'NOTA' is an attribute name, so the next '(' opens an enumeration
        let units = subset("<!ATTLIST a NOTA (1x|2y) #IMPLIED>");
        assert_eq!(units[4], unit(Name, "NOTA"));
        assert_eq!(units[7], unit(Nmtoken, "1x"));
    }

    #[test]
    fn test_enumeration_errors() {
        assert_eq!(subset_err("<!ATTLIST a b (x|<) #IMPLIED>"), ErrorKind::Name);
        assert_eq!(subset_err("<!ATTLIST a b (x,y) #IMPLIED>"), ErrorKind::Name);
    }

    #[test]
    fn test_entity_declarations() {
        assert_eq!(
            subset("<!ENTITY % p SYSTEM 'p.ent'><!ENTITY i PUBLIC \"-//X\" 'i.gif' NDATA gif>"),
            vec![
                unit(EntityStart, "<!ENTITY"),
                unit(Whitespace, " "),
                unit(Percent, "%"),
                unit(Whitespace, " "),
                unit(Name, "p"),
                unit(Whitespace, " "),
                unit(SystemIdentifier, "SYSTEM"),
                unit(Whitespace, " "),
                unit(StringFragment, "p.ent"),
                unit(EndChar, ">"),
                unit(EntityStart, "<!ENTITY"),
                unit(Whitespace, " "),
                unit(Name, "i"),
                unit(Whitespace, " "),
                unit(PublicIdentifier, "PUBLIC"),
                unit(Whitespace, " "),
                unit(StringFragment, "-//X"),
                unit(Whitespace, " "),
                unit(StringFragment, "i.gif"),
                unit(Whitespace, " "),
                unit(NDataIdentifier, "NDATA"),
                unit(Whitespace, " "),
                unit(Name, "gif"),
                unit(EndChar, ">"),
            ]
        );
    }

    #[test]
    fn test_entity_value_fragments() {
        assert_eq!(
            subset("<!ENTITY e \"a&b;c%d;&#38;\">"),
            vec![
                unit(EntityStart, "<!ENTITY"),
                unit(Whitespace, " "),
                unit(Name, "e"),
                unit(Whitespace, " "),
                unit(StringFragment, "a"),
                unit(EntityReference, "b"),
                unit(StringFragment, "c"),
                unit(ParameterEntityReference, "d"),
                unit(CharacterReference, "38"),
                unit(StringFragment, ""),
                unit(EndChar, ">"),
            ]
        );
    }

    #[test]
    fn test_entity_value_errors() {
        assert_eq!(scan_err("<!DOCTYPE r [<!ENTITY e 'abc").kind, ErrorKind::Eof);
        assert_eq!(scan_err("<!DOCTYPE r [<!ENTITY e 'a&b;").kind, ErrorKind::Eof);
        assert_eq!(subset_err("<!ENTITY e 'a%b'>"), ErrorKind::ParameterEntity);
    }

    #[test]
    fn test_notation_declaration() {
        assert_eq!(
            subset_kinds("<!NOTATION gif PUBLIC 'image/gif' 'viewer'>"),
            vec![
                NotationStart,
                Whitespace,
                Name,
                Whitespace,
                PublicIdentifier,
                Whitespace,
                StringLiteral,
                Whitespace,
                StringLiteral,
                EndChar,
            ]
        );
    }

    #[test]
    fn test_comment_and_pi_in_subset() {
        let mut scanner = DocumentScanner::new("<!DOCTYPE r [<!-- c --><?pi x?>]><r/>");
        let mut seen = Vec::new();
        loop {
            let unit = scanner.next_unit(None).unwrap();
            if unit.is_eof() {
                break;
            }
            seen.push((unit.kind, scanner.context(), scanner.in_dtd()));
        }
        assert_eq!(seen[4], (LSquareBracket, Context::DTDDeclarations, true));
        assert_eq!(seen[5], (Comment, Context::DTDDeclarations, true));
        assert_eq!(seen[6], (PIStart, Context::PI, true));
        assert_eq!(seen[9], (PIEnd, Context::DTDDeclarations, true));
        assert_eq!(seen[10], (RSquareBracket, Context::Doctype, false));
        assert_eq!(seen[11], (EndChar, Context::TopLevel, false));
    }
}
