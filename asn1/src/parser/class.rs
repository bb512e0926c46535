use crate::{
    ast::{
        FieldSpecKind, FieldSpecNode, ObjectClassDefn, Optionality, RequiredToken, Spanned,
        TokenOrGroup,
    },
    token::TokenKind,
};

use super::{Parser, ParserError, Result};

impl<'a> Parser<'a> {
    /// Parse the definition of an information object class
    /// ```bnf
    /// ObjectClassDefn ::= CLASS "{" FieldSpec ("," FieldSpec)* "}" WithSyntaxSpec?
    /// ```
    pub(super) fn object_class(&mut self) -> Result<ObjectClassDefn> {
        let start = self.next(&[TokenKind::KwClass])?.span();
        self.next(&[TokenKind::LeftCurly])?;

        let mut fields = vec![];
        loop {
            fields.push(self.field_spec()?);

            if self.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                == TokenKind::RightCurly
            {
                break;
            }
        }

        let syntax = if self.peek_kind(0) == Some(TokenKind::KwWith)
            && self.peek_kind(1) == Some(TokenKind::KwSyntax)
        {
            Some(self.with_syntax()?)
        } else {
            None
        };

        Ok(ObjectClassDefn {
            fields,
            syntax,
            span: self.span_from(start),
        })
    }

    /// A single field of an object class.  The kind of field is decided by the
    /// case of its name and by what follows the name.
    /// ```bnf
    /// FieldSpec ::= typefieldreference TypeOptionalitySpec?
    ///             | valuefieldreference Type UNIQUE? ValueOptionalitySpec?
    ///             | valuefieldreference FieldName ValueOptionalitySpec?
    ///             | valuesetfieldreference Type ValueSetOptionalitySpec?
    ///             | valuesetfieldreference FieldName ValueSetOptionalitySpec?
    ///             | objectfieldreference DefinedObjectClass ObjectOptionalitySpec?
    ///             | objectsetfieldreference DefinedObjectClass ObjectSetOptionalitySpec?
    /// ```
    fn field_spec(&mut self) -> Result<FieldSpecNode> {
        let tok = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
        let name = self.field_name(tok);

        let next = self.peek(&[])?;
        let kind = if tok.kind == TokenKind::TypeField {
            match next.kind {
                TokenKind::KwOptional
                | TokenKind::KwDefault
                | TokenKind::Comma
                | TokenKind::RightCurly => FieldSpecKind::Type {
                    optionality: self.optionality(|this| this.ty())?,
                },
                TokenKind::TypeField | TokenKind::ValueField => {
                    FieldSpecKind::VariableTypeValueSet {
                        field_name: self.field_name_chain()?,
                        optionality: self.optionality(|this| this.setting())?,
                    }
                }
                _ => FieldSpecKind::FixedTypeValueSetOrObjectSet {
                    governor: self.ty()?,
                    optionality: self.optionality(|this| this.setting())?,
                },
            }
        } else {
            match next.kind {
                TokenKind::TypeField | TokenKind::ValueField => FieldSpecKind::VariableTypeValue {
                    field_name: self.field_name_chain()?,
                    optionality: self.optionality(|this| this.value())?,
                },
                _ => {
                    let governor = self.ty()?;
                    let unique = self.consume(TokenKind::KwUnique).map(|t| t.span());
                    FieldSpecKind::FixedTypeValueOrObject {
                        governor,
                        unique,
                        optionality: self.optionality(|this| this.value())?,
                    }
                }
            }
        };

        Ok(FieldSpecNode {
            span: self.span_from(name.span),
            name,
            kind,
        })
    }

    /// `OPTIONAL`, `DEFAULT` followed by a setting, or nothing
    fn optionality<T>(
        &mut self,
        default: impl FnOnce(&mut Self) -> Result<Spanned<T>>,
    ) -> Result<Optionality<Spanned<T>>> {
        let tok = self.peek(&[
            TokenKind::KwOptional,
            TokenKind::KwDefault,
            TokenKind::Comma,
            TokenKind::RightCurly,
        ])?;

        match tok.kind {
            TokenKind::KwOptional => {
                self.next(&[TokenKind::KwOptional])?;
                Ok(Optionality::Optional)
            }
            TokenKind::KwDefault => {
                self.next(&[TokenKind::KwDefault])?;
                Ok(Optionality::Default(default(self)?))
            }
            _ => Ok(Optionality::Mandatory),
        }
    }

    /// A chain of field names, e.g. `&obj.&Type`
    fn field_name_chain(&mut self) -> Result<Vec<Spanned<String>>> {
        let mut chain = vec![];

        loop {
            let tok = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
            chain.push(self.field_name(tok));

            let more = self.peek_kind(0) == Some(TokenKind::Dot)
                && matches!(
                    self.peek_kind(1),
                    Some(TokenKind::TypeField | TokenKind::ValueField)
                );
            if !more {
                break;
            }
            self.next(&[TokenKind::Dot])?;
        }

        Ok(chain)
    }

    /// The user defined syntax for objects of a class
    /// ```bnf
    /// WithSyntaxSpec ::= WITH SYNTAX "{" TokenOrGroupSpec* "}"
    /// ```
    fn with_syntax(&mut self) -> Result<Spanned<Vec<TokenOrGroup>>> {
        let start = self.next(&[TokenKind::KwWith])?.span();
        self.next(&[TokenKind::KwSyntax])?;
        self.next(&[TokenKind::LeftCurly])?;

        let tokens = self.token_or_group_list(TokenKind::RightCurly)?;
        self.next(&[TokenKind::RightCurly])?;

        Ok(Spanned::new(tokens, self.span_from(start)))
    }

    /// Sequence of literals, fields and optional groups, up to the given
    /// closing token
    /// ```bnf
    /// TokenOrGroupSpec ::= RequiredToken | "[" TokenOrGroupSpec+ "]"
    /// RequiredToken ::= Literal | PrimitiveFieldName
    /// ```
    fn token_or_group_list(&mut self, end: TokenKind) -> Result<Vec<TokenOrGroup>> {
        let mut tokens = vec![];

        loop {
            let tok = self.peek(&[])?;
            if tok.kind == end {
                break;
            }

            let item = match tok.kind {
                TokenKind::LeftSquare => self.nested(|this| {
                    let start = this.next(&[TokenKind::LeftSquare])?.span();
                    let inner = this.token_or_group_list(TokenKind::RightSquare)?;
                    this.next(&[TokenKind::RightSquare])?;
                    Ok(TokenOrGroup::Group(Spanned::new(
                        inner,
                        this.span_from(start),
                    )))
                })?,
                TokenKind::TypeField | TokenKind::ValueField => {
                    self.next(&[])?;
                    TokenOrGroup::Required(RequiredToken::Field(self.field_name(tok)))
                }
                _ if tok.kind == TokenKind::Comma || tok.is_word() => {
                    self.next(&[])?;
                    TokenOrGroup::Required(RequiredToken::Literal(self.spanned_ident(tok)))
                }
                _ => {
                    return Err(ParserError::Expected {
                        kind: vec![
                            TokenKind::LeftSquare,
                            TokenKind::TypeField,
                            TokenKind::ValueField,
                            TokenKind::Comma,
                            TokenKind::Word,
                            end,
                        ]
                        .into(),
                        got: Some(tok.kind),
                        offset: tok.offset,
                        id: tok.id,
                    })
                }
            };
            tokens.push(item);
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{AssignmentKind, FieldSpecKind, ObjectClassDefn, RequiredToken, TokenOrGroup},
        parser::tests::parse,
    };

    fn parse_class(class: &str) -> ObjectClassDefn {
        let source = format!("M DEFINITIONS ::= BEGIN C ::= {class} END");
        let modules = parse(&source).unwrap();
        match &modules[0].assignments[0].kind {
            AssignmentKind::ObjectClass(class) => class.clone(),
            kind => panic!("not a class assignment: {kind:?}"),
        }
    }

    #[test]
    fn field_kinds() {
        let class = parse_class(
            "CLASS {
                &Type OPTIONAL,
                &id INTEGER UNIQUE,
                &value &Type DEFAULT 5,
                &Values INTEGER,
                &VarSet &Type OPTIONAL,
                &obj OTHER-CLASS,
                &Objs OTHER-CLASS
            }",
        );

        let kinds: Vec<_> = class.fields.iter().map(|f| &f.kind).collect();
        assert!(matches!(kinds[0], FieldSpecKind::Type { .. }));
        assert!(matches!(
            kinds[1],
            FieldSpecKind::FixedTypeValueOrObject {
                unique: Some(_),
                ..
            }
        ));
        assert!(matches!(kinds[2], FieldSpecKind::VariableTypeValue { .. }));
        assert!(matches!(
            kinds[3],
            FieldSpecKind::FixedTypeValueSetOrObjectSet { .. }
        ));
        assert!(matches!(kinds[4], FieldSpecKind::VariableTypeValueSet { .. }));
        assert!(matches!(
            kinds[5],
            FieldSpecKind::FixedTypeValueOrObject { unique: None, .. }
        ));
        assert!(matches!(
            kinds[6],
            FieldSpecKind::FixedTypeValueSetOrObjectSet { .. }
        ));
        assert_eq!(class.fields[2].name.value, "value");
    }

    #[test]
    fn with_syntax_groups() {
        let class = parse_class(
            "CLASS { &id INTEGER, &Type OPTIONAL }
            WITH SYNTAX { ID &id [TYPE &Type [,]] }",
        );

        let syntax = class.syntax.unwrap().value;
        assert_eq!(syntax.len(), 3);
        assert!(matches!(
            &syntax[0],
            TokenOrGroup::Required(RequiredToken::Literal(l)) if l.value == "ID"
        ));
        assert!(matches!(
            &syntax[1],
            TokenOrGroup::Required(RequiredToken::Field(f)) if f.value == "id"
        ));
        let TokenOrGroup::Group(group) = &syntax[2] else {
            panic!("expected a group");
        };
        assert_eq!(group.value.len(), 3);
    }
}
