use crate::{
    ast::{Parameter, Setting, Spanned},
    token::TokenKind,
};

use super::{Parser, Result};

impl<'a> Parser<'a> {
    /// Parse the formal parameters of a parameterized assignment
    /// ```bnf
    /// ParameterList ::= "{" Parameter ("," Parameter)* "}"
    /// Parameter ::= ParamGovernor ":" DummyReference | DummyReference
    /// ```
    pub(super) fn parameter_list(&mut self) -> Result<Vec<Parameter>> {
        self.next(&[TokenKind::LeftCurly])?;

        let mut parameters = vec![];
        loop {
            let tok = self.peek(&[])?;

            let dummy_only = matches!(
                tok.kind,
                TokenKind::Identifier | TokenKind::TypeReference | TokenKind::Word
            ) && matches!(
                self.peek_kind(1),
                Some(TokenKind::Comma | TokenKind::RightCurly)
            );

            let parameter = if dummy_only {
                self.next(&[])?;
                Parameter {
                    governor: None,
                    dummy: self.spanned_ident(tok),
                }
            } else {
                let governor = self.ty()?;
                self.next(&[TokenKind::Colon])?;
                let dummy = self.next(&[
                    TokenKind::Identifier,
                    TokenKind::TypeReference,
                    TokenKind::Word,
                ])?;
                Parameter {
                    governor: Some(governor),
                    dummy: self.spanned_ident(dummy),
                }
            };
            parameters.push(parameter);

            if self.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                == TokenKind::RightCurly
            {
                break;
            }
        }

        Ok(parameters)
    }

    /// Parse the parameter list for a parameterized reference
    /// ```bnf
    /// ActualParameterList ::= "{" ActualParameter ("," ActualParameter)* "}"
    /// ```
    pub(super) fn actual_parameter_list(&mut self) -> Result<Vec<Spanned<Setting>>> {
        self.nested(|this| {
            this.next(&[TokenKind::LeftCurly])?;

            let mut parameters = vec![];
            loop {
                parameters.push(this.setting()?);

                if this.next(&[TokenKind::Comma, TokenKind::RightCurly])?.kind
                    == TokenKind::RightCurly
                {
                    break;
                }
            }

            Ok(parameters)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::AssignmentKind, parser::tests::parse};

    #[test]
    fn formal_and_actual_parameters() {
        let modules = parse(
            "M DEFINITIONS ::= BEGIN
                obj{INTEGER:val, Type} MY-CLASS ::= { &id val, &Type Type }
                use MY-CLASS ::= obj{5, BOOLEAN}
            END",
        )
        .unwrap();

        let assignments = &modules[0].assignments;
        let parameters = assignments[0].parameters.as_ref().unwrap();
        assert_eq!(parameters.len(), 2);
        assert!(parameters[0].governor.is_some());
        assert!(parameters[1].governor.is_none());
        assert_eq!(parameters[1].dummy.value, "Type");

        let AssignmentKind::Value { value, .. } = &assignments[1].kind else {
            panic!("expected a value assignment");
        };
        let crate::ast::Value::Reference(reference) = &value.value else {
            panic!("expected a reference");
        };
        assert_eq!(reference.actual_parameters.as_ref().unwrap().len(), 2);
    }
}
