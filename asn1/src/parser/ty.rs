use crate::{
    ast::{
        Component, ComponentOptionality, NamedNumber, Reference, Spanned, StringKind, Tag,
        TagClass, Type,
    },
    token::TokenKind,
};

use super::{Parser, ParserError, Result};

/// Every token that can start a type
const TYPE_START: &[TokenKind] = &[
    TokenKind::LeftSquare,
    TokenKind::KwBoolean,
    TokenKind::KwNull,
    TokenKind::KwInteger,
    TokenKind::KwReal,
    TokenKind::KwEnumerated,
    TokenKind::KwBit,
    TokenKind::KwOctet,
    TokenKind::KwObject,
    TokenKind::KwRelativeOid,
    TokenKind::KwSequence,
    TokenKind::KwSet,
    TokenKind::KwChoice,
    TokenKind::KwBmpString,
    TokenKind::KwGeneralString,
    TokenKind::KwGraphicString,
    TokenKind::KwIA5String,
    TokenKind::KwISO646String,
    TokenKind::KwNumericString,
    TokenKind::KwPrintableString,
    TokenKind::KwTeletexString,
    TokenKind::KwT61String,
    TokenKind::KwUniversalString,
    TokenKind::KwUTF8String,
    TokenKind::KwVideotexString,
    TokenKind::KwVisibleString,
    TokenKind::KwGeneralizedTime,
    TokenKind::KwUTCTime,
    TokenKind::KwObjectDescriptor,
    TokenKind::TypeReference,
    TokenKind::Word,
];

impl<'a> Parser<'a> {
    /// Parse a type, including any constraints following it
    /// ```bnf
    /// Type ::= BuiltinType | ReferencedType | Type Constraint
    /// ```
    pub(super) fn ty(&mut self) -> Result<Spanned<Type>> {
        self.nested(|this| {
            let mut ty = this.base_type()?;

            while this.peek_kind(0) == Some(TokenKind::LeftParen) {
                let constraint = this.constraint()?;
                let span = ty.span.to(constraint.span);
                ty = Spanned::new(
                    Type::Constrained {
                        ty: Box::new(ty),
                        constraint,
                    },
                    span,
                );
            }

            Ok(ty)
        })
    }

    /// A type without constraints
    fn base_type(&mut self) -> Result<Spanned<Type>> {
        let tok = self.peek(TYPE_START)?;
        let start = tok.span();

        let ty = match tok.kind {
            TokenKind::LeftSquare => return self.tagged_type(),
            TokenKind::TypeReference | TokenKind::Word => return self.reference_type(),
            TokenKind::KwBoolean => {
                self.next(&[TokenKind::KwBoolean])?;
                Type::Boolean
            }
            TokenKind::KwNull => {
                self.next(&[TokenKind::KwNull])?;
                Type::Null
            }
            TokenKind::KwReal => {
                self.next(&[TokenKind::KwReal])?;
                Type::Real
            }
            TokenKind::KwInteger => {
                self.next(&[TokenKind::KwInteger])?;
                if self.at_named_number_list() {
                    Type::Integer(self.named_number_list()?)
                } else {
                    Type::Integer(vec![])
                }
            }
            TokenKind::KwEnumerated => {
                self.next(&[TokenKind::KwEnumerated])?;
                self.enumerated_type()?
            }
            TokenKind::KwBit => {
                self.next(&[TokenKind::KwBit])?;
                self.next(&[TokenKind::KwString])?;
                if self.at_named_number_list() {
                    Type::BitString(self.named_number_list()?)
                } else {
                    Type::BitString(vec![])
                }
            }
            TokenKind::KwOctet => {
                self.next(&[TokenKind::KwOctet])?;
                self.next(&[TokenKind::KwString])?;
                Type::OctetString
            }
            TokenKind::KwObject => {
                self.next(&[TokenKind::KwObject])?;
                self.next(&[TokenKind::KwIdentifier])?;
                Type::ObjectIdentifier
            }
            TokenKind::KwRelativeOid => {
                self.next(&[TokenKind::KwRelativeOid])?;
                Type::RelativeOid
            }
            TokenKind::KwSequence | TokenKind::KwSet => {
                self.next(&[TokenKind::KwSequence, TokenKind::KwSet])?;
                let is_sequence = tok.kind == TokenKind::KwSequence;

                if self.peek_kind(0) == Some(TokenKind::LeftCurly) {
                    let (components, extensible) = self.component_list()?;
                    if is_sequence {
                        Type::Sequence {
                            components,
                            extensible,
                        }
                    } else {
                        Type::Set {
                            components,
                            extensible,
                        }
                    }
                } else {
                    // the size constraint is not evaluated
                    if self.consume(TokenKind::KwSize).is_some() {
                        self.constraint()?;
                    } else if self.peek_kind(0) == Some(TokenKind::LeftParen) {
                        self.constraint()?;
                    }
                    self.next(&[TokenKind::KwOf])?;
                    let element = Box::new(self.ty()?);
                    if is_sequence {
                        Type::SequenceOf(element)
                    } else {
                        Type::SetOf(element)
                    }
                }
            }
            TokenKind::KwChoice => {
                self.next(&[TokenKind::KwChoice])?;
                let (alternatives, extensible) = self.component_list()?;
                Type::Choice {
                    alternatives,
                    extensible,
                }
            }
            kind => {
                self.next(&[])?;
                let string = match kind {
                    TokenKind::KwBmpString => StringKind::BmpString,
                    TokenKind::KwGeneralString => StringKind::GeneralString,
                    TokenKind::KwGraphicString => StringKind::GraphicString,
                    TokenKind::KwIA5String => StringKind::IA5String,
                    TokenKind::KwISO646String => StringKind::ISO646String,
                    TokenKind::KwNumericString => StringKind::NumericString,
                    TokenKind::KwPrintableString => StringKind::PrintableString,
                    TokenKind::KwTeletexString => StringKind::TeletexString,
                    TokenKind::KwT61String => StringKind::T61String,
                    TokenKind::KwUniversalString => StringKind::UniversalString,
                    TokenKind::KwUTF8String => StringKind::UTF8String,
                    TokenKind::KwVideotexString => StringKind::VideotexString,
                    TokenKind::KwVisibleString => StringKind::VisibleString,
                    TokenKind::KwGeneralizedTime => StringKind::GeneralizedTime,
                    TokenKind::KwUTCTime => StringKind::UTCTime,
                    _ => StringKind::ObjectDescriptor,
                };
                Type::CharacterString(string)
            }
        };

        Ok(Spanned::new(ty, self.span_from(start)))
    }

    /// A reference to a type, possibly qualified by a module name, possibly
    /// with actual parameters, or a reference to a field of an object class.
    /// ```bnf
    /// ReferencedType ::= (modulereference ".")? typereference ActualParameterList?
    ///                  | objectclassreference ("." FieldName)+
    /// ```
    fn reference_type(&mut self) -> Result<Spanned<Type>> {
        let first = self.next(&[TokenKind::TypeReference, TokenKind::Word])?;

        let is_reference = |kind| matches!(kind, Some(TokenKind::TypeReference | TokenKind::Word));
        let (module, name) =
            if self.peek_kind(0) == Some(TokenKind::Dot) && is_reference(self.peek_kind(1)) {
                self.next(&[TokenKind::Dot])?;
                let name = self.next(&[TokenKind::TypeReference, TokenKind::Word])?;
                (Some(self.spanned_ident(first)), self.spanned_ident(name))
            } else {
                (None, self.spanned_ident(first))
            };

        let mut reference = Reference {
            module,
            name,
            actual_parameters: None,
        };

        if self.at_field_name() {
            let mut field = vec![];
            while self.at_field_name() {
                self.next(&[TokenKind::Dot])?;
                let tok = self.next(&[TokenKind::TypeField, TokenKind::ValueField])?;
                field.push(self.field_name(tok));
            }

            let ty = Type::ClassField {
                class: reference,
                field,
            };
            return Ok(Spanned::new(ty, self.span_from(first.span())));
        }

        if self.peek_kind(0) == Some(TokenKind::LeftCurly) {
            reference.actual_parameters = Some(self.actual_parameter_list()?);
        }

        Ok(Spanned::new(
            Type::Reference(reference),
            self.span_from(first.span()),
        ))
    }

    /// Is the next token `.&field`
    fn at_field_name(&self) -> bool {
        self.peek_kind(0) == Some(TokenKind::Dot)
            && matches!(
                self.peek_kind(1),
                Some(TokenKind::TypeField | TokenKind::ValueField)
            )
    }

    /// A type with a tag prefix
    /// ```bnf
    /// PrefixedType ::= "[" Class? number "]" (IMPLICIT | EXPLICIT)? Type
    /// ```
    fn tagged_type(&mut self) -> Result<Spanned<Type>> {
        let start = self.next(&[TokenKind::LeftSquare])?.span();

        let tok = self.peek(&[
            TokenKind::KwUniversal,
            TokenKind::KwApplication,
            TokenKind::KwPrivate,
            TokenKind::Number,
        ])?;
        let class = match tok.kind {
            TokenKind::KwUniversal => TagClass::Universal,
            TokenKind::KwApplication => TagClass::Application,
            TokenKind::KwPrivate => TagClass::Private,
            _ => TagClass::ContextSpecific,
        };
        if class != TagClass::ContextSpecific {
            self.next(&[])?;
        }

        let number = self.next(&[TokenKind::Number])?;
        let number = self.unsigned_number(number)?;
        self.next(&[TokenKind::RightSquare])?;

        let implicit = match self.peek_kind(0) {
            Some(TokenKind::KwImplicit) => Some(true),
            Some(TokenKind::KwExplicit) => Some(false),
            _ => None,
        };
        if implicit.is_some() {
            self.next(&[])?;
        }

        let ty = Box::new(self.ty()?);
        let tag = Tag {
            class,
            number,
            implicit,
        };

        Ok(Spanned::new(Type::Tagged { tag, ty }, self.span_from(start)))
    }

    /// Does a list of named numbers follow.  Any other braced group is left
    /// alone, as it could be the start of a value or a defined syntax.
    fn at_named_number_list(&self) -> bool {
        if self.peek_kind(0) != Some(TokenKind::LeftCurly)
            || self.peek_kind(1) != Some(TokenKind::Identifier)
            || self.peek_kind(2) != Some(TokenKind::LeftParen)
        {
            return false;
        }

        let mut n = 3;
        while let Some(kind) = self.peek_kind(n) {
            if kind == TokenKind::RightParen {
                break;
            }
            n += 1;
        }

        matches!(
            self.peek_kind(n + 1),
            Some(TokenKind::Comma | TokenKind::RightCurly)
        )
    }

    /// ```bnf
    /// NamedNumberList ::= "{" identifier "(" SignedNumber ")" ("," ...)* "}"
    /// ```
    fn named_number_list(&mut self) -> Result<Vec<NamedNumber>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut numbers = vec![];
        loop {
            let name = self.next(&[TokenKind::Identifier])?;
            let name = self.spanned_ident(name);
            self.next(&[TokenKind::LeftParen])?;
            let number = self.signed_number()?;
            self.next(&[TokenKind::RightParen])?;

            numbers.push(NamedNumber {
                name,
                number: Some(number),
            });

            if self.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                == TokenKind::RightCurly
            {
                break;
            }
        }

        Ok(numbers)
    }

    /// Items of an enumerated type, including any extension marker
    fn enumerated_type(&mut self) -> Result<Type> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut items = vec![];
        let mut extensible = false;
        loop {
            let tok = self.next(&[TokenKind::Identifier, TokenKind::Ellipsis])?;
            if tok.kind == TokenKind::Ellipsis {
                extensible = true;
            } else {
                let name = self.spanned_ident(tok);
                let number = if self.consume(TokenKind::LeftParen).is_some() {
                    let number = self.signed_number()?;
                    self.next(&[TokenKind::RightParen])?;
                    Some(number)
                } else {
                    None
                };
                items.push(NamedNumber { name, number });
            }

            if self.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                == TokenKind::RightCurly
            {
                break;
            }
        }

        Ok(Type::Enumerated { items, extensible })
    }

    /// Components of a SEQUENCE, SET or CHOICE type
    /// ```bnf
    /// ComponentTypeList ::= "{" (ComponentType ("," ComponentType)*)? "}"
    /// ComponentType ::= identifier Type (OPTIONAL | DEFAULT Value)? | "..."
    /// ```
    fn component_list(&mut self) -> Result<(Vec<Component>, bool)> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut components = vec![];
        let mut extensible = false;
        if self.consume(TokenKind::RightCurly).is_some() {
            return Ok((components, extensible));
        }

        loop {
            let tok = self.next(&[
                TokenKind::Identifier,
                TokenKind::Ellipsis,
                TokenKind::KwComponents,
            ])?;

            match tok.kind {
                TokenKind::Ellipsis => extensible = true,
                TokenKind::KwComponents => {
                    return Err(ParserError::Unsupported {
                        feature: "COMPONENTS OF types",
                        offset: tok.offset,
                        id: tok.id,
                    })
                }
                _ => {
                    let name = self.spanned_ident(tok);
                    let ty = self.ty()?;
                    let optionality = if self.consume(TokenKind::KwOptional).is_some() {
                        ComponentOptionality::Optional
                    } else if self.consume(TokenKind::KwDefault).is_some() {
                        ComponentOptionality::Default(self.value()?)
                    } else {
                        ComponentOptionality::Mandatory
                    };
                    components.push(Component {
                        name,
                        ty,
                        optionality,
                    });
                }
            }

            if self.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                == TokenKind::RightCurly
            {
                break;
            }
        }

        Ok((components, extensible))
    }

    /// A constraint within parentheses.  Constraints are not evaluated, so
    /// the source text is kept for display.
    fn constraint(&mut self) -> Result<Spanned<String>> {
        let start = self.next(&[TokenKind::LeftParen])?;

        let mut depth = 1;
        let mut text = String::from("(");
        loop {
            let tok = self.next(&[])?;
            match tok.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                _ => (),
            }

            if !text.ends_with('(') && tok.kind != TokenKind::RightParen {
                text.push(' ');
            }
            text.push_str(tok.value);

            if depth == 0 {
                break;
            }
        }

        Ok(Spanned::new(text, self.span_from(start.span())))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{AssignmentKind, Type},
        parser::tests::parse,
    };

    fn parse_type(ty: &str) -> Type {
        let source = format!("M DEFINITIONS ::= BEGIN T ::= {ty} END");
        let modules = parse(&source).unwrap();
        match &modules[0].assignments[0].kind {
            AssignmentKind::Type(ty) => ty.value.clone(),
            kind => panic!("not a type assignment: {kind:?}"),
        }
    }

    #[test]
    fn named_numbers() {
        let Type::Integer(numbers) = parse_type("INTEGER { a(1), b(-2) }") else {
            panic!("expected an integer");
        };
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[1].number.as_ref().unwrap().value, -2);
    }

    #[test]
    fn constrained() {
        let Type::Constrained { constraint, .. } = parse_type("INTEGER (0..255)") else {
            panic!("expected a constrained type");
        };
        assert_eq!(constraint.value, "(0 .. 255)");
    }

    #[test]
    fn class_field() {
        let Type::ClassField { class, field } = parse_type("MY-CLASS.&id") else {
            panic!("expected a class field type");
        };
        assert_eq!(class.name.value, "MY-CLASS");
        assert_eq!(field[0].value, "id");
    }

    #[test]
    fn sequence_of_with_size() {
        let ty = parse_type("SEQUENCE SIZE (1..4) OF [0] IMPLICIT OCTET STRING");
        let Type::SequenceOf(element) = ty else {
            panic!("expected a sequence of");
        };
        assert!(matches!(element.value, Type::Tagged { .. }));
    }

    #[test]
    fn enumerated_extension() {
        let Type::Enumerated { items, extensible } = parse_type("ENUMERATED { a, b(5), ..., c }")
        else {
            panic!("expected an enumeration");
        };
        assert_eq!(items.len(), 3);
        assert!(extensible);
    }
}
