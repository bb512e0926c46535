use crate::{
    ast::{
        Braced, DefinedSyntaxToken, FieldSetting, ObjectDefn, ObjectDefnNode, ObjectSetElement,
        ObjectSetSpec, ValueSetSpec,
    },
    token::TokenKind,
};

use super::{Parser, Result};

impl<'a> Parser<'a> {
    /// Parse the contents of a braced object definition.  Objects whose first
    /// token is a field reference use the default syntax, everything else is
    /// matched against the class's defined syntax later on.
    /// ```bnf
    /// ObjectDefn ::= "{" (FieldSetting ("," FieldSetting)*)? "}"
    ///              | "{" DefinedSyntaxToken* "}"
    /// ```
    pub(crate) fn object_defn(&mut self, braced: &Braced) -> Result<ObjectDefnNode> {
        let defn = match self.peek_kind(0) {
            None => ObjectDefn::Default(vec![]),
            Some(TokenKind::TypeField | TokenKind::ValueField) => {
                ObjectDefn::Default(self.default_syntax()?)
            }
            Some(_) => ObjectDefn::Defined(self.defined_syntax()?),
        };

        Ok(ObjectDefnNode {
            defn,
            span: braced.span,
        })
    }

    /// ```bnf
    /// FieldSetting ::= PrimitiveFieldName Setting
    /// ```
    fn default_syntax(&mut self) -> Result<Vec<FieldSetting>> {
        let mut settings = vec![];

        loop {
            let tok = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
            let field = self.field_name(tok);
            let setting = self.setting()?;
            settings.push(FieldSetting { field, setting });

            if self.is_eof() {
                break;
            }
            self.next(&[TokenKind::Comma])?;
        }

        Ok(settings)
    }

    /// Split a defined syntax object into literals and settings.  A word is
    /// read as a literal unless it is part of a longer reference, anything
    /// else starts a setting.
    fn defined_syntax(&mut self) -> Result<Vec<DefinedSyntaxToken>> {
        let mut tokens = vec![];

        while let Some(tok) = self.peek_nth(0) {
            let literal = tok.kind == TokenKind::Comma
                || (tok.is_word()
                    && !tok.kind.starts_setting()
                    && self.peek_kind(1) != Some(TokenKind::Dot));

            if literal {
                self.next(&[])?;
                tokens.push(DefinedSyntaxToken::Literal(self.spanned_ident(tok)));
            } else {
                tokens.push(DefinedSyntaxToken::Setting(self.setting()?));
            }
        }

        Ok(tokens)
    }

    /// Parse the contents of the braces of an object set
    /// ```bnf
    /// ObjectSetSpec ::= Element (("|" | UNION) Element)* ("," "...")? | "..."
    /// Element ::= DefinedObject | DefinedObjectSet | ObjectDefn
    /// ```
    pub(crate) fn object_set_spec(&mut self) -> Result<ObjectSetSpec> {
        let mut elements = vec![];
        let mut extensible = false;

        while !self.is_eof() {
            let tok = self.peek(&[
                TokenKind::LeftCurly,
                TokenKind::Identifier,
                TokenKind::TypeReference,
                TokenKind::Word,
                TokenKind::Ellipsis,
            ])?;

            match tok.kind {
                TokenKind::Ellipsis => {
                    self.next(&[TokenKind::Ellipsis])?;
                    extensible = true;
                }
                TokenKind::LeftCurly => {
                    let braced = self.braced()?;
                    let mut parser = self.sub_parser(&braced);
                    let defn = parser.nested(|this| this.object_defn(&braced))?;
                    parser.finish()?;
                    elements.push(ObjectSetElement::Defn(defn));
                }
                _ => elements.push(ObjectSetElement::Reference(self.reference()?)),
            }

            if self.is_eof() {
                break;
            }
            self.next(&[TokenKind::Pipe, TokenKind::KwUnion, TokenKind::Comma])?;
        }

        Ok(ObjectSetSpec {
            elements,
            extensible,
        })
    }

    /// Parse the contents of the braces of a value set
    /// ```bnf
    /// ValueSetSpec ::= Value (("|" | UNION) Value)* ("," "...")?
    /// ```
    pub(crate) fn value_set_spec(&mut self) -> Result<ValueSetSpec> {
        let mut values = vec![];
        let mut extensible = false;

        while !self.is_eof() {
            if self.consume(TokenKind::Ellipsis).is_some() {
                extensible = true;
            } else {
                values.push(self.value()?);
            }

            if self.is_eof() {
                break;
            }
            self.next(&[TokenKind::Pipe, TokenKind::KwUnion, TokenKind::Comma])?;
        }

        Ok(ValueSetSpec { values, extensible })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Braced, DefinedSyntaxToken, ObjectDefn, ObjectSetElement, Setting, Type, Value},
        compiler::{Features, SourceId},
        lexer::Lexer,
        parser::Parser,
    };

    fn braced(source: &str) -> Braced {
        let lexer = Lexer::new(SourceId::test(), source, Features::default());
        let mut parser = Parser::from_lexer(lexer, Features::default()).unwrap();
        parser.braced().unwrap()
    }

    fn object(source: &str) -> ObjectDefn {
        let group = braced(source);
        let mut parser = Parser::from_braced(&group, Features::default());
        let defn = parser.object_defn(&group).unwrap();
        parser.finish().unwrap();
        defn.defn
    }

    #[test]
    fn default_syntax() {
        let ObjectDefn::Default(settings) = object("{ &id 5, &Type BOOLEAN }") else {
            panic!("expected default syntax");
        };
        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].field.value, "id");
        assert_eq!(settings[0].setting.value, Setting::Value(Value::Number(5)));
        assert_eq!(settings[1].setting.value, Setting::Type(Type::Boolean));
    }

    #[test]
    fn empty_object() {
        assert!(matches!(object("{}"), ObjectDefn::Default(s) if s.is_empty()));
    }

    #[test]
    fn defined_syntax() {
        let ObjectDefn::Defined(tokens) = object("{ ID 5 TYPE BOOLEAN, NAME Mod.val }") else {
            panic!("expected defined syntax");
        };

        let literals: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                DefinedSyntaxToken::Literal(l) => Some(l.value.as_str()),
                DefinedSyntaxToken::Setting(_) => None,
            })
            .collect();
        assert_eq!(literals, ["ID", "TYPE", ",", "NAME"]);
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn object_set() {
        let group = braced("{ obj1 | { &id 2 } UNION Other.Set, ... }");
        let mut parser = Parser::from_braced(&group, Features::default());
        let spec = parser.object_set_spec().unwrap();

        assert_eq!(spec.elements.len(), 3);
        assert!(matches!(spec.elements[1], ObjectSetElement::Defn(_)));
        assert!(
            matches!(&spec.elements[2], ObjectSetElement::Reference(r) if r.module.is_some())
        );
        assert!(spec.extensible);
    }

    #[test]
    fn value_set() {
        let group = braced("{ 1 | 2 | 3 }");
        let mut parser = Parser::from_braced(&group, Features::default());
        let spec = parser.value_set_spec().unwrap();
        assert_eq!(spec.values.len(), 3);
        assert!(!spec.extensible);
    }
}
