mod class;
mod error;
mod module;
mod object;
mod parameterized;
mod ty;
mod value;

use unicode_normalization::UnicodeNormalization;

use crate::{
    ast::{Braced, ModuleDefinition, Spanned},
    compiler::{Features, SourceId},
    diagnostic::Span,
    lexer::Lexer,
    token::{Token, TokenKind},
    util::CowVec,
};

pub use self::error::{ParserError, Result};

/// Parser for ASN.1 definition files
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    /// All tokens of the input, without comments
    tokens: Vec<Token<'a>>,

    /// Index of the next token to be consumed
    position: usize,

    /// Location to report when the end of the input is reached
    eof: (SourceId, usize),

    /// Enabled language extensions
    features: Features,

    /// Current recursion depth of the parser.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over a whole source file
    pub fn from_lexer(lexer: Lexer<'a>, features: Features) -> Result<Self> {
        let eof = (lexer.id, lexer.eof_offset());
        let tokens = lexer.run()?;

        Ok(Self {
            tokens,
            position: 0,
            eof,
            features,
            depth: 0,
        })
    }

    /// Create a parser over the contents of a braced group, to interpret it
    /// once the expected kind of value is known.
    pub(crate) fn from_braced(braced: &'a Braced, features: Features) -> Self {
        Self {
            tokens: braced.tokens.iter().map(|t| t.as_token()).collect(),
            position: 0,
            eof: (braced.span.source, braced.span.end.saturating_sub(1)),
            features,
            depth: 0,
        }
    }

    /// Run the parser to produce a set of ASN.1 module definitions
    pub fn run(mut self) -> Result<Vec<ModuleDefinition>> {
        let mut modules = vec![];

        while !self.is_eof() {
            modules.push(self.module_definition()?);
        }

        Ok(modules)
    }

    /// Have all tokens been consumed
    pub(crate) fn is_eof(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Error if any tokens have not been consumed
    pub(crate) fn finish(&self) -> Result {
        match self.tokens.get(self.position) {
            Some(tok) => Err(ParserError::UnexpectedToken {
                got: tok.kind,
                offset: tok.offset,
                id: tok.id,
            }),
            None => Ok(()),
        }
    }

    /// Consume a token of the given kind or return an error.
    /// If an empty list is given, returns any token.
    fn next(&mut self, kind: impl Into<CowVec<TokenKind>>) -> Result<Token<'a>> {
        let tok = self.peek(kind)?;
        self.position += 1;
        Ok(tok)
    }

    /// Peek a token without consuming it or return an error if the token is not
    /// of one of the provided kinds. If an empty list is given, returns any token.
    fn peek(&self, kind: impl Into<CowVec<TokenKind>>) -> Result<Token<'a>> {
        let kind = kind.into();

        let Some(&peek) = self.tokens.get(self.position) else {
            return Err(ParserError::Expected {
                kind,
                got: None,
                offset: self.eof.1,
                id: self.eof.0,
            });
        };

        if kind.contains(&peek.kind) || kind.is_empty() {
            Ok(peek)
        } else {
            Err(ParserError::Expected {
                kind,
                got: Some(peek.kind),
                offset: peek.offset,
                id: peek.id,
            })
        }
    }

    /// Look ahead `n` tokens without any checks
    fn peek_nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens.get(self.position + n).copied()
    }

    /// Kind of the token `n` tokens ahead
    fn peek_kind(&self, n: usize) -> Option<TokenKind> {
        self.peek_nth(n).map(|t| t.kind)
    }

    /// Consume the next token only if it is of the given kind
    fn consume(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        let tok = self.peek_nth(0).filter(|t| t.kind == kind)?;
        self.position += 1;
        Some(tok)
    }

    /// Location of the most recently consumed token
    fn previous_span(&self) -> Span {
        match self.position.checked_sub(1).and_then(|p| self.tokens.get(p)) {
            Some(tok) => tok.span(),
            None => Span::new(self.eof.0, self.eof.1, self.eof.1),
        }
    }

    /// Location from the start of the given span to the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }

    /// Run a nested parser, checking that the recursion limit is not exceeded
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.features.max_depth {
            let (id, offset) = match self.peek_nth(0) {
                Some(tok) => (tok.id, tok.offset),
                None => self.eof,
            };
            return Err(ParserError::ParserDepthExceeded { offset, id });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Create a parser for a braced group found while parsing, sharing the
    /// recursion depth of this parser.
    fn sub_parser<'b>(&self, braced: &'b Braced) -> Parser<'b> {
        Parser {
            depth: self.depth + 1,
            ..Parser::from_braced(braced, self.features)
        }
    }

    /// Collect every token between a pair of braces, including nested braces
    fn braced(&mut self) -> Result<Braced> {
        let start = self.next(&[TokenKind::LeftCurly])?;

        let mut depth = 1;
        let mut tokens = vec![];
        loop {
            let tok = self.next(&[])?;
            match tok.kind {
                TokenKind::LeftCurly => depth += 1,
                TokenKind::RightCurly => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Braced {
                            tokens,
                            span: start.span().to(tok.span()),
                        });
                    }
                }
                _ => (),
            }
            tokens.push(tok.to_owned());
        }
    }

    /// Get the name of an identifier or reference.  With unicode identifiers
    /// enabled, the name is NFC normalised so that equivalent spellings refer
    /// to the same thing.
    fn ident_value(&self, tok: Token) -> String {
        if self.features.unicode_identifiers {
            tok.value.nfc().collect()
        } else {
            tok.value.to_string()
        }
    }

    /// Get the name of an identifier with its location
    fn spanned_ident(&self, tok: Token) -> Spanned<String> {
        Spanned::new(self.ident_value(tok), tok.span())
    }

    /// Get the name of a field reference token, without the leading `&`
    fn field_name(&self, tok: Token) -> Spanned<String> {
        let name = self.ident_value(tok);
        let name = name.strip_prefix('&').unwrap_or(&name).to_string();
        Spanned::new(name, tok.span())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ast::AssignmentKind;

    /// Parse a whole source text
    pub(crate) fn parse(source: &str) -> Result<Vec<ModuleDefinition>> {
        let lexer = Lexer::new(SourceId::test(), source, Features::default());
        Parser::from_lexer(lexer, Features::default())?.run()
    }

    #[test]
    fn module_header() {
        let modules = parse(
            "Test { iso 3 } DEFINITIONS AUTOMATIC TAGS EXTENSIBILITY IMPLIED ::= BEGIN
                EXPORTS ALL;
                IMPORTS A, b FROM Other { 1 2 } C FROM Third;
                T ::= INTEGER
            END",
        )
        .unwrap();

        assert_eq!(modules.len(), 1);
        let module = &modules[0];
        assert_eq!(module.name.value, "Test");
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[0].symbols.len(), 2);
        assert_eq!(module.imports[1].module.value, "Third");
        assert_eq!(module.assignments.len(), 1);
    }

    #[test]
    fn assignment_kinds() {
        let modules = parse(
            "M DEFINITIONS ::= BEGIN
                T ::= SEQUENCE { a INTEGER, b BOOLEAN OPTIONAL, ... }
                v INTEGER ::= 5
                C ::= CLASS { &id INTEGER UNIQUE }
                Set C ::= { { &id 1 } | obj }
            END",
        )
        .unwrap();

        let kinds: Vec<_> = modules[0].assignments.iter().map(|a| &a.kind).collect();
        assert!(matches!(kinds[0], AssignmentKind::Type(_)));
        assert!(matches!(kinds[1], AssignmentKind::Value { .. }));
        assert!(matches!(kinds[2], AssignmentKind::ObjectClass(_)));
        assert!(matches!(kinds[3], AssignmentKind::Set { .. }));
    }

    #[test]
    fn depth_limit() {
        let mut source = String::from("M DEFINITIONS ::= BEGIN T ::= ");
        for _ in 0..200 {
            source.push_str("SEQUENCE OF ");
        }
        source.push_str("INTEGER END");

        let err = parse(&source).unwrap_err();
        assert!(matches!(err, ParserError::ParserDepthExceeded { .. }));
    }

    #[test]
    fn missing_end() {
        let err = parse("M DEFINITIONS ::= BEGIN T ::= INTEGER").unwrap_err();
        assert!(matches!(err, ParserError::Expected { got: None, .. }));
    }
}
