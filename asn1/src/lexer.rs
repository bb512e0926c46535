use std::{collections::HashMap, str::CharIndices, sync::OnceLock};

use crate::{
    compiler::{Features, SourceId},
    token::{self, Token, TokenKind},
    util::{Peek, Peekable},
};

/// State for converting a source string into a token stream
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /// Iterator over all chars in the file
    chars: Peekable<CharIndices<'a>>,

    /// The original source text
    source: &'a str,

    /// File ID to use for all returned tokens
    pub(crate) id: SourceId,

    /// Enabled language extensions
    features: Features,
}

/// Any error that can be emitted while lexing a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LexerError {
    /// A character that cannot start any token
    Unrecognised { offset: usize, id: SourceId },

    /// A `/*` comment without a matching `*/`
    NonTerminatedComment { offset: usize, id: SourceId },

    /// A string without its closing quote
    NonTerminatedString { offset: usize, id: SourceId },

    /// A number with a leading zero or a malformed bstring / hstring
    InvalidNumber { offset: usize, id: SourceId },
}

pub type Result<T, E = LexerError> = std::result::Result<T, E>;

impl<'a> Lexer<'a> {
    /// Create a new Lexer for a given source file.  `id` represents a file
    /// ID that will be returned with each token.
    pub fn new(id: SourceId, source: &'a str, features: Features) -> Self {
        Self {
            chars: source.char_indices().n_peekable(),
            source,
            id,
            features,
        }
    }

    /// Lex the whole file, discarding comments and whitespace.
    pub fn run(mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = vec![];
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Byte offset just past the end of the source
    pub fn eof_offset(&self) -> usize {
        self.source.len()
    }

    /// Return the next token.  Returns `None` once the end of the file has been
    /// reached.  Skips all whitespace and comments before the start of a token.
    fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        while let Some(&(offset, c)) = self.chars.peek(0) {
            match c {
                '-' | '\u{2011}' => {
                    if !self.single_comment() {
                        break;
                    }
                }
                '/' => {
                    if !self.multi_comment(offset)? {
                        break;
                    }
                }
                _ if self.is_whitespace(c) => {
                    self.chars.next();
                }
                _ => break,
            }
        }

        let Some(&(offset, c)) = self.chars.peek(0) else {
            return Ok(None);
        };

        let tok = match c {
            '{' => self.simple_token(TokenKind::LeftCurly, offset, 1),
            '}' => self.simple_token(TokenKind::RightCurly, offset, 1),
            '<' => self.simple_token(TokenKind::Less, offset, 1),
            '>' => self.simple_token(TokenKind::Greater, offset, 1),
            ',' => self.simple_token(TokenKind::Comma, offset, 1),
            '(' => self.simple_token(TokenKind::LeftParen, offset, 1),
            ')' => self.simple_token(TokenKind::RightParen, offset, 1),
            '[' => self.simple_token(TokenKind::LeftSquare, offset, 1),
            ']' => self.simple_token(TokenKind::RightSquare, offset, 1),
            ';' => self.simple_token(TokenKind::SemiColon, offset, 1),
            '@' => self.simple_token(TokenKind::At, offset, 1),
            '|' => self.simple_token(TokenKind::Pipe, offset, 1),
            '!' => self.simple_token(TokenKind::Exclamation, offset, 1),
            '^' => self.simple_token(TokenKind::Caret, offset, 1),
            '-' | '\u{2011}' => self.simple_token(TokenKind::Hyphen, offset, c.len_utf8()),
            '.' => {
                if self.source[offset..].starts_with("...") {
                    self.simple_token(TokenKind::Ellipsis, offset, 3)
                } else if self.source[offset..].starts_with("..") {
                    self.simple_token(TokenKind::Range, offset, 2)
                } else {
                    self.simple_token(TokenKind::Dot, offset, 1)
                }
            }
            ':' => {
                if self.source[offset..].starts_with("::=") {
                    self.simple_token(TokenKind::Assignment, offset, 3)
                } else {
                    self.simple_token(TokenKind::Colon, offset, 1)
                }
            }
            '"' => self.cstring(offset)?,
            '\'' => self.bhstring(offset)?,
            '&' => self.field_reference(offset)?,
            _ if c.is_ascii_digit() => self.number(offset)?,
            _ if self.is_identifier_start(c) => self.identifier(offset),
            _ => return Err(LexerError::Unrecognised { offset, id: self.id }),
        };

        Ok(Some(tok))
    }

    /// Return a token of a known length, advancing past it
    fn simple_token(&mut self, kind: TokenKind, offset: usize, len: usize) -> Token<'a> {
        let value = &self.source[offset..offset + len];
        for _ in value.chars() {
            self.chars.next();
        }

        Token {
            kind,
            value,
            offset,
            id: self.id,
        }
    }

    /// Skip a single line comment which is text between pairs of two hyphens
    /// or the end of the line.  Non-breaking hyphens are also accepted instead
    /// of hyphens.
    fn single_comment(&mut self) -> bool {
        let Some(&(_, second)) = self.chars.peek(1) else {
            return false;
        };
        if !matches!(second, '-' | '\u{2011}') {
            return false;
        }
        self.chars.next(); // Consume the first hyphen
        self.chars.next(); // Consume the second hyphen

        while let Some(&(_, next)) = self.chars.peek(0) {
            if is_newline(next) {
                break;
            }

            if matches!(next, '-' | '\u{2011}') {
                if let Some(&(_, '-' | '\u{2011}')) = self.chars.peek(1) {
                    self.chars.next();
                    self.chars.next();
                    break;
                }
            }

            self.chars.next();
        }

        true
    }

    /// Skip a multi line comment which is text between `/*` and `*/`.  The comment
    /// ends when a matching `*/` has been found for every `/*` encountered.
    fn multi_comment(&mut self, offset: usize) -> Result<bool> {
        let Some(&(_, c)) = self.chars.peek(1) else {
            return Ok(false);
        };
        if c != '*' {
            // not a start of comment
            return Ok(false);
        }

        self.chars.next();
        self.chars.next();

        let mut depth = 1;
        while let Some((_, c)) = self.chars.next() {
            if c == '/' && matches!(self.chars.peek(0), Some((_, '*'))) {
                depth += 1;
                self.chars.next();
            } else if c == '*' && matches!(self.chars.peek(0), Some((_, '/'))) {
                depth -= 1;
                self.chars.next();

                if depth == 0 {
                    break;
                }
            }
        }

        if depth != 0 {
            return Err(LexerError::NonTerminatedComment {
                offset,
                id: self.id,
            });
        }

        Ok(true)
    }

    /// Parse a character string.  Two adjacent quotes inside the string
    /// represent a single quote character.
    fn cstring(&mut self, offset: usize) -> Result<Token<'a>> {
        self.chars.next();

        let mut len = 1;
        loop {
            let Some((_, c)) = self.chars.next() else {
                return Err(LexerError::NonTerminatedString {
                    offset,
                    id: self.id,
                });
            };
            len += c.len_utf8();

            if c == '"' {
                if let Some(&(_, '"')) = self.chars.peek(0) {
                    self.chars.next();
                    len += 1;
                    continue;
                }
                break;
            }
        }

        Ok(Token {
            kind: TokenKind::CString,
            value: &self.source[offset..offset + len],
            offset,
            id: self.id,
        })
    }

    /// Parse a binary or hexadecimal string, e.g. `'0101'B` or `'0AFF'H`.
    /// Whitespace is permitted inside the quotes.
    fn bhstring(&mut self, offset: usize) -> Result<Token<'a>> {
        self.chars.next();

        let mut len = 1;
        loop {
            let Some((_, c)) = self.chars.next() else {
                return Err(LexerError::NonTerminatedString {
                    offset,
                    id: self.id,
                });
            };
            len += c.len_utf8();

            if c == '\'' {
                break;
            }
            if !c.is_ascii_hexdigit() && !self.is_whitespace(c) {
                return Err(LexerError::InvalidNumber {
                    offset,
                    id: self.id,
                });
            }
        }

        let kind = match self.chars.next() {
            Some((_, 'B')) => TokenKind::BString,
            Some((_, 'H')) => TokenKind::HString,
            _ => {
                return Err(LexerError::InvalidNumber {
                    offset,
                    id: self.id,
                })
            }
        };
        len += 1;

        let value = &self.source[offset..offset + len];
        if kind == TokenKind::BString && value[1..len - 2].chars().any(|c| c.is_ascii_hexdigit() && c != '0' && c != '1')
        {
            return Err(LexerError::InvalidNumber {
                offset,
                id: self.id,
            });
        }

        Ok(Token {
            kind,
            value,
            offset,
            id: self.id,
        })
    }

    /// Parse a number ([1-9][0-9]*)|0
    fn number(&mut self, offset: usize) -> Result<Token<'a>> {
        let mut len = 0;
        while let Some(&(_, ch)) = self.chars.peek(0) {
            if !ch.is_ascii_digit() {
                break;
            }
            self.chars.next();
            len += 1;
        }

        let value = &self.source[offset..offset + len];
        if value.starts_with('0') && len > 1 {
            return Err(LexerError::InvalidNumber {
                offset,
                id: self.id,
            });
        }

        Ok(Token {
            kind: TokenKind::Number,
            value,
            offset,
            id: self.id,
        })
    }

    /// Parse a field reference, `&` followed directly by an identifier.
    fn field_reference(&mut self, offset: usize) -> Result<Token<'a>> {
        let Some(&(_, c)) = self.chars.peek(1) else {
            return Err(LexerError::Unrecognised { offset, id: self.id });
        };
        if !self.is_identifier_start(c) {
            return Err(LexerError::Unrecognised { offset, id: self.id });
        }

        self.chars.next();
        let ident = self.identifier(offset + 1);

        let kind = if c.is_lowercase() {
            TokenKind::ValueField
        } else {
            TokenKind::TypeField
        };

        Ok(Token {
            kind,
            value: &self.source[offset..offset + 1 + ident.value.len()],
            offset,
            id: self.id,
        })
    }

    /// Parse an identifier.  Could be a type reference, identifier, word or
    /// keyword, depending on the case of the characters within it.
    fn identifier(&mut self, offset: usize) -> Token<'a> {
        let mut len = 0;
        let mut contains_lower = false;
        while let Some(&(_, c)) = self.chars.peek(0) {
            if self.is_identifier_continue(c) {
                contains_lower |= c.is_lowercase();
                len += c.len_utf8();
                self.chars.next();
                continue;
            }

            // a single hyphen may join two parts of an identifier, but two
            // hyphens start a comment and a trailing hyphen is not allowed
            if c == '-' || c == '\u{2011}' {
                if let Some(&(_, next)) = self.chars.peek(1) {
                    if self.is_identifier_continue(next) {
                        len += c.len_utf8();
                        self.chars.next();
                        continue;
                    }
                }
            }

            break;
        }

        let value = &self.source[offset..offset + len];
        let first = value.chars().next().unwrap_or_default();

        let ident_kind = if first.is_lowercase() {
            TokenKind::Identifier
        } else if contains_lower {
            TokenKind::TypeReference
        } else {
            TokenKind::Word
        };

        let kind = if self.features.lowercase_keywords {
            keywords().get(value.to_uppercase().as_str()).copied()
        } else {
            keywords().get(value).copied()
        };

        Token {
            kind: kind.unwrap_or(ident_kind),
            value,
            offset,
            id: self.id,
        }
    }

    /// Can the character start an identifier
    fn is_identifier_start(&self, c: char) -> bool {
        if self.features.unicode_identifiers {
            c.is_alphabetic()
        } else {
            c.is_ascii_alphabetic()
        }
    }

    /// Can the character continue an identifier, not including hyphens
    fn is_identifier_continue(&self, c: char) -> bool {
        if self.features.unicode_identifiers {
            c.is_alphanumeric() || c == '_' || c == '$'
        } else {
            c.is_ascii_alphanumeric() || c == '_' || c == '$'
        }
    }

    /// Is the character any valid whitespace
    fn is_whitespace(&self, c: char) -> bool {
        // A0 = Non breaking space
        "\t \u{A0}".contains(c) || is_newline(c) || (self.features.unicode_whitespace && c.is_whitespace())
    }
}

/// Is the character a valid newline character
fn is_newline(c: char) -> bool {
    // 0B = Vertical Tab
    // 0C = Form Feed
    "\n\x0B\x0C\r".contains(c)
}

/// Get a mapping from keyword strings to their token kind
fn keywords() -> &'static HashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| token::KEYWORD_DATA.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(SourceId::test(), source, Features::default())
            .run()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn field_references() {
        assert_eq!(
            lex("&Type &id &Other-Type"),
            vec![
                (TokenKind::TypeField, "&Type"),
                (TokenKind::ValueField, "&id"),
                (TokenKind::TypeField, "&Other-Type"),
            ]
        );
    }

    #[test]
    fn words_and_references() {
        assert_eq!(
            lex("TYPE-IDENTIFIER IDENTIFIED BY MyType my-value CLASS"),
            vec![
                (TokenKind::Word, "TYPE-IDENTIFIER"),
                (TokenKind::Word, "IDENTIFIED"),
                (TokenKind::KwReserved, "BY"),
                (TokenKind::TypeReference, "MyType"),
                (TokenKind::Identifier, "my-value"),
                (TokenKind::KwClass, "CLASS"),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex("a -- one -- b -- two\n c /* three /* nested */ */ d"),
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::Identifier, "b"),
                (TokenKind::Identifier, "c"),
                (TokenKind::Identifier, "d"),
            ]
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            lex("::= ... .. . : -5"),
            vec![
                (TokenKind::Assignment, "::="),
                (TokenKind::Ellipsis, "..."),
                (TokenKind::Range, ".."),
                (TokenKind::Dot, "."),
                (TokenKind::Colon, ":"),
                (TokenKind::Hyphen, "-"),
                (TokenKind::Number, "5"),
            ]
        );
    }

    #[test]
    fn strings() {
        assert_eq!(
            lex(r#""say ""hi""" '0101'B '0AFF'H"#),
            vec![
                (TokenKind::CString, r#""say ""hi""""#),
                (TokenKind::BString, "'0101'B"),
                (TokenKind::HString, "'0AFF'H"),
            ]
        );
    }

    #[test]
    fn lowercase_keywords() {
        let features = Features {
            lowercase_keywords: true,
            ..Default::default()
        };
        let tokens = Lexer::new(SourceId::test(), "integer", features).run().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::KwInteger);
    }

    #[test]
    fn errors() {
        let err = Lexer::new(SourceId::test(), "a /* b", Features::default()).run();
        assert!(matches!(err, Err(LexerError::NonTerminatedComment { offset: 2, .. })));

        let err = Lexer::new(SourceId::test(), "007", Features::default()).run();
        assert!(matches!(err, Err(LexerError::InvalidNumber { .. })));

        let err = Lexer::new(SourceId::test(), "a # b", Features::default()).run();
        assert!(matches!(err, Err(LexerError::Unrecognised { offset: 2, .. })));
    }
}
