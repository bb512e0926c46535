use crate::{
    ast::{Assignment, AssignmentKind, Import, ModuleDefinition, Spanned},
    token::TokenKind,
};

use super::{ParserError, Parser, Result};

/// Any token that can start a reference to an assignment
const REFERENCE: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::TypeReference,
    TokenKind::Word,
];

impl<'a> Parser<'a> {
    /// Parse a single ASN.1 module definition
    /// ```asn1
    /// ModuleDefinition ::= ModuleIdentifier DEFINITIONS TagDefault
    ///     ExtensionDefault "::=" BEGIN ModuleBody END
    /// ```
    /// The module identifier's object identifier and the tagging and
    /// extensibility defaults do not affect information objects, so are
    /// checked and dropped.
    pub(super) fn module_definition(&mut self) -> Result<ModuleDefinition> {
        let name = self.next(&[TokenKind::TypeReference, TokenKind::Word])?;
        let name = self.spanned_ident(name);

        let tok = self.peek(&[TokenKind::LeftCurly, TokenKind::KwDefinitions])?;
        if tok.kind == TokenKind::LeftCurly {
            self.braced()?;
        }

        self.next(&[TokenKind::KwDefinitions])?;
        self.tag_default()?;
        self.extension_default()?;
        self.next(&[TokenKind::Assignment])?;
        self.next(&[TokenKind::KwBegin])?;

        self.exports()?;
        let imports = self.imports()?;

        let mut assignments = vec![];
        loop {
            let tok = self.peek(&[
                TokenKind::Identifier,
                TokenKind::TypeReference,
                TokenKind::Word,
                TokenKind::KwEnd,
            ])?;
            if tok.kind == TokenKind::KwEnd {
                break;
            }
            assignments.push(self.assignment()?);
        }

        self.next(&[TokenKind::KwEnd])?;

        Ok(ModuleDefinition {
            name,
            imports,
            assignments,
        })
    }

    /// Parse `EXPLICIT TAGS` or `IMPLICIT TAGS` or `AUTOMATIC TAGS` or none
    fn tag_default(&mut self) -> Result {
        let tok = self.peek(&[
            TokenKind::KwExplicit,
            TokenKind::KwImplicit,
            TokenKind::KwAutomatic,
            TokenKind::KwExtensibility,
            TokenKind::Assignment,
        ])?;

        if matches!(
            tok.kind,
            TokenKind::KwExplicit | TokenKind::KwImplicit | TokenKind::KwAutomatic
        ) {
            self.next(vec![tok.kind])?;
            self.next(&[TokenKind::KwTags])?;
        }

        Ok(())
    }

    /// Parse `EXTENSIBILITY IMPLIED` or none
    fn extension_default(&mut self) -> Result {
        if self.consume(TokenKind::KwExtensibility).is_some() {
            self.next(&[TokenKind::KwImplied])?;
        }
        Ok(())
    }

    /// Exported symbols section.  Every assignment is visible to other
    /// modules, so the list itself is not kept.
    fn exports(&mut self) -> Result {
        if self.consume(TokenKind::KwExports).is_none() {
            return Ok(());
        }

        let tok = self.peek(&[
            TokenKind::KwAll,
            TokenKind::SemiColon,
            TokenKind::Identifier,
            TokenKind::TypeReference,
            TokenKind::Word,
        ])?;
        if tok.kind == TokenKind::KwAll {
            self.next(&[TokenKind::KwAll])?;
        } else if tok.kind != TokenKind::SemiColon {
            self.symbol_list()?;
        }

        self.next(&[TokenKind::SemiColon])?;
        Ok(())
    }

    /// Imported symbols section
    /// ```asn1
    /// Imports ::= IMPORTS (Symbol ("," Symbol)* FROM GlobalModuleReference)* ";"
    /// ```
    fn imports(&mut self) -> Result<Vec<Import>> {
        let mut imports = vec![];
        if self.consume(TokenKind::KwImports).is_none() {
            return Ok(imports);
        }

        loop {
            let tok = self.peek(&[
                TokenKind::SemiColon,
                TokenKind::Identifier,
                TokenKind::TypeReference,
                TokenKind::Word,
            ])?;
            if tok.kind == TokenKind::SemiColon {
                break;
            }

            let symbols = self.symbol_list()?;
            self.next(&[TokenKind::KwFrom])?;
            let module = self.next(&[TokenKind::TypeReference, TokenKind::Word])?;
            let module = self.spanned_ident(module);

            // the module's object identifier is not used to find the module
            if self.peek_kind(0) == Some(TokenKind::LeftCurly) {
                self.braced()?;
            }

            imports.push(Import { symbols, module });
        }

        self.next(&[TokenKind::SemiColon])?;
        Ok(imports)
    }

    /// Comma separated list of names, a parameterized name is written with a
    /// trailing `{}`
    fn symbol_list(&mut self) -> Result<Vec<Spanned<String>>> {
        let mut symbols = vec![];

        loop {
            let tok = self.next(REFERENCE)?;
            symbols.push(self.spanned_ident(tok));

            if self.consume(TokenKind::LeftCurly).is_some() {
                self.next(&[TokenKind::RightCurly])?;
            }

            if self.consume(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(symbols)
    }

    /// Parse a single assignment to a name
    /// ```asn1
    /// Assignment ::= typereference ParameterList? "::=" Type
    ///              | valuereference ParameterList? Type "::=" Value
    ///              | typereference ParameterList? Type "::=" "{" ElementSetSpecs "}"
    ///              | objectclassreference "::=" ObjectClass
    /// ```
    fn assignment(&mut self) -> Result<Assignment> {
        let tok = self.next(REFERENCE)?;
        let name = self.spanned_ident(tok);

        let parameters = if self.peek_kind(0) == Some(TokenKind::LeftCurly) {
            Some(self.parameter_list()?)
        } else {
            None
        };

        let kind = if tok.kind == TokenKind::Identifier {
            let governor = self.ty()?;
            self.next(&[TokenKind::Assignment])?;
            let value = self.value()?;
            AssignmentKind::Value { governor, value }
        } else if self.consume(TokenKind::Assignment).is_some() {
            let next = self.peek(&[])?;
            if next.kind == TokenKind::KwClass {
                if parameters.is_some() {
                    return Err(ParserError::Unsupported {
                        feature: "parameterized object classes",
                        offset: next.offset,
                        id: next.id,
                    });
                }
                AssignmentKind::ObjectClass(self.object_class()?)
            } else {
                AssignmentKind::Type(self.ty()?)
            }
        } else {
            let governor = self.ty()?;
            self.next(&[TokenKind::Assignment])?;
            let set = self.braced()?;
            AssignmentKind::Set { governor, set }
        };

        Ok(Assignment {
            name,
            parameters,
            kind,
        })
    }
}
