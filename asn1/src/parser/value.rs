use crate::{
    ast::{OidComponent, Reference, Setting, Spanned, Type, Value},
    token::{Token, TokenKind},
};

use super::{Parser, ParserError, Result};

/// Every token that can start a value
const VALUE_START: &[TokenKind] = &[
    TokenKind::KwTrue,
    TokenKind::KwFalse,
    TokenKind::KwNull,
    TokenKind::Number,
    TokenKind::Hyphen,
    TokenKind::CString,
    TokenKind::BString,
    TokenKind::HString,
    TokenKind::LeftCurly,
    TokenKind::Identifier,
    TokenKind::TypeReference,
    TokenKind::Word,
];

impl<'a> Parser<'a> {
    /// Parse any value.  Braced values are kept as tokens, as their meaning
    /// depends on the governing type.
    pub(super) fn value(&mut self) -> Result<Spanned<Value>> {
        let tok = self.peek(VALUE_START)?;

        let value = match tok.kind {
            TokenKind::KwTrue => {
                self.next(&[TokenKind::KwTrue])?;
                Value::Boolean(true)
            }
            TokenKind::KwFalse => {
                self.next(&[TokenKind::KwFalse])?;
                Value::Boolean(false)
            }
            TokenKind::KwNull => {
                self.next(&[TokenKind::KwNull])?;
                Value::Null
            }
            TokenKind::Number | TokenKind::Hyphen => {
                let number = self.signed_number()?;
                return Ok(number.map(Value::Number));
            }
            TokenKind::CString => {
                self.next(&[TokenKind::CString])?;
                let inner = &tok.value[1..tok.value.len() - 1];
                Value::CString(inner.replace("\"\"", "\""))
            }
            TokenKind::BString | TokenKind::HString => {
                self.next(&[TokenKind::BString, TokenKind::HString])?;
                let digits = tok
                    .value
                    .trim_start_matches('\'')
                    .trim_end_matches(['B', 'H', 'b', 'h'])
                    .trim_end_matches('\'')
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if tok.kind == TokenKind::BString {
                    Value::BString(digits)
                } else {
                    Value::HString(digits)
                }
            }
            TokenKind::LeftCurly => {
                let braced = self.braced()?;
                let span = braced.span;
                return Ok(Spanned::new(Value::Braced(braced), span));
            }
            TokenKind::Identifier if self.peek_kind(1) == Some(TokenKind::Colon) => {
                self.next(&[TokenKind::Identifier])?;
                self.next(&[TokenKind::Colon])?;
                let alternative = self.spanned_ident(tok);
                let value = Box::new(self.nested(|this| this.value())?);
                Value::Choice { alternative, value }
            }
            _ => Value::Reference(self.reference()?),
        };

        Ok(Spanned::new(value, self.span_from(tok.span())))
    }

    /// Parse a type or a value, deciding by the first token.  Upper case
    /// references are always read as types, analysis reinterprets them as
    /// value sets or object sets if needed.
    pub(super) fn setting(&mut self) -> Result<Spanned<Setting>> {
        let tok = self.peek(&[])?;

        let is_type = match tok.kind {
            // `Module.value`
            TokenKind::TypeReference | TokenKind::Word => !(self.peek_kind(1)
                == Some(TokenKind::Dot)
                && self.peek_kind(2) == Some(TokenKind::Identifier)),
            TokenKind::KwNull | TokenKind::KwTrue | TokenKind::KwFalse => false,
            TokenKind::LeftSquare => true,
            kind => kind.starts_setting(),
        };

        if is_type {
            Ok(self.ty()?.map(Setting::Type))
        } else {
            Ok(self.value()?.map(Setting::Value))
        }
    }

    /// A reference to a value, object or set, possibly qualified by a module
    /// name and possibly with actual parameters
    /// ```bnf
    /// Reference ::= (modulereference ".")? reference ActualParameterList?
    /// ```
    pub(super) fn reference(&mut self) -> Result<Reference> {
        let first = self.next(&[
            TokenKind::Identifier,
            TokenKind::TypeReference,
            TokenKind::Word,
        ])?;

        let qualified = first.kind != TokenKind::Identifier
            && self.peek_kind(0) == Some(TokenKind::Dot)
            && matches!(
                self.peek_kind(1),
                Some(TokenKind::Identifier | TokenKind::TypeReference | TokenKind::Word)
            );

        let (module, name) = if qualified {
            self.next(&[TokenKind::Dot])?;
            let name = self.next(&[
                TokenKind::Identifier,
                TokenKind::TypeReference,
                TokenKind::Word,
            ])?;
            (Some(self.spanned_ident(first)), self.spanned_ident(name))
        } else {
            (None, self.spanned_ident(first))
        };

        let actual_parameters = if self.peek_kind(0) == Some(TokenKind::LeftCurly) {
            Some(self.actual_parameter_list()?)
        } else {
            None
        };

        Ok(Reference {
            module,
            name,
            actual_parameters,
        })
    }

    /// An integer, with an optional leading minus sign
    pub(super) fn signed_number(&mut self) -> Result<Spanned<i64>> {
        let start = self.peek(&[TokenKind::Number, TokenKind::Hyphen])?;
        let negative = self.consume(TokenKind::Hyphen).is_some();
        let tok = self.next(&[TokenKind::Number])?;

        let text = if negative {
            format!("-{}", tok.value)
        } else {
            tok.value.to_string()
        };
        let number = text.parse().map_err(|_| ParserError::NumberTooLarge {
            offset: tok.offset,
            id: tok.id,
        })?;

        Ok(Spanned::new(number, self.span_from(start.span())))
    }

    /// Value of a number token that cannot be negative
    pub(super) fn unsigned_number(&self, tok: Token) -> Result<u64> {
        tok.value.parse().map_err(|_| ParserError::NumberTooLarge {
            offset: tok.offset,
            id: tok.id,
        })
    }

    /// The contents of the braces of an object identifier value
    /// ```bnf
    /// ObjIdComponents ::= (number | identifier | identifier "(" number ")")+
    /// ```
    pub(crate) fn oid_components(&mut self) -> Result<Vec<OidComponent>> {
        let mut components = vec![];

        while !self.is_eof() {
            let tok = self.next(&[TokenKind::Number, TokenKind::Identifier])?;

            if tok.kind == TokenKind::Number {
                let number = self.unsigned_number(tok)?;
                components.push(OidComponent {
                    name: None,
                    number: Some(Spanned::new(number, tok.span())),
                });
                continue;
            }

            let name = Some(self.spanned_ident(tok));
            let number = if self.consume(TokenKind::LeftParen).is_some() {
                let num = self.next(&[TokenKind::Number])?;
                self.next(&[TokenKind::RightParen])?;
                Some(Spanned::new(self.unsigned_number(num)?, num.span()))
            } else {
                None
            };
            components.push(OidComponent { name, number });
        }

        Ok(components)
    }

    /// The contents of the braces of a SEQUENCE OF or SET OF value
    pub(crate) fn value_list(&mut self) -> Result<Vec<Spanned<Value>>> {
        let mut values = vec![];

        while !self.is_eof() {
            values.push(self.value()?);
            if !self.is_eof() {
                self.next(&[TokenKind::Comma])?;
            }
        }

        Ok(values)
    }

    /// The contents of the braces of a SEQUENCE or SET value
    /// ```bnf
    /// ComponentValueList ::= (identifier Value ("," identifier Value)*)?
    /// ```
    pub(crate) fn named_value_list(&mut self) -> Result<Vec<(Spanned<String>, Spanned<Value>)>> {
        let mut values = vec![];

        while !self.is_eof() {
            let name = self.next(&[TokenKind::Identifier])?;
            let name = self.spanned_ident(name);
            values.push((name, self.value()?));
            if !self.is_eof() {
                self.next(&[TokenKind::Comma])?;
            }
        }

        Ok(values)
    }

    /// Re-read an upper case reference found in a defined syntax object as a
    /// type setting
    pub(crate) fn literal_as_type(name: Spanned<String>) -> Spanned<Setting> {
        let span = name.span;
        Spanned::new(Setting::Type(Type::Reference(Reference::simple(name))), span)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Braced, Value},
        compiler::{Features, SourceId},
        lexer::Lexer,
        parser::Parser,
    };

    fn braced(source: &str) -> Braced {
        let lexer = Lexer::new(SourceId::test(), source, Features::default());
        let mut parser = Parser::from_lexer(lexer, Features::default()).unwrap();
        parser.braced().unwrap()
    }

    #[test]
    fn oid_components() {
        let group = braced("{ iso standard(0) 8571 }");
        let mut parser = Parser::from_braced(&group, Features::default());
        let components = parser.oid_components().unwrap();

        assert_eq!(components.len(), 3);
        assert_eq!(components[0].name.as_ref().unwrap().value, "iso");
        assert_eq!(components[1].number.as_ref().unwrap().value, 0);
        assert_eq!(components[2].number.as_ref().unwrap().value, 8571);
    }

    #[test]
    fn value_kinds() {
        let group = braced(r#"{ -5, "a""b", '0101'B, 'FF'H, alt : TRUE, Mod.val }"#);
        let mut parser = Parser::from_braced(&group, Features::default());
        let values: Vec<_> = parser
            .value_list()
            .unwrap()
            .into_iter()
            .map(|v| v.value)
            .collect();

        assert_eq!(values[0], Value::Number(-5));
        assert_eq!(values[1], Value::CString("a\"b".to_string()));
        assert_eq!(values[2], Value::BString("0101".to_string()));
        assert_eq!(values[3], Value::HString("FF".to_string()));
        assert!(matches!(&values[4], Value::Choice { alternative, .. } if alternative.value == "alt"));
        assert!(matches!(&values[5], Value::Reference(r) if r.module.is_some()));
    }

    #[test]
    fn number_too_large() {
        let group = braced("{ 99999999999999999999 }");
        let mut parser = Parser::from_braced(&group, Features::default());
        assert!(parser.value_list().is_err());
    }
}
