//! Matching of defined syntax objects against the `WITH SYNTAX` grammar of
//! their class.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    ast::{DefinedSyntaxToken, Setting, Spanned},
    diagnostic::Span,
    parser::Parser,
};

use super::{
    class::{CompiledObjectClass, FieldId},
    error::AnalysisError,
    syntax::{SyntaxElement, SyntaxGrammar},
    Result,
};

/// Outcome of matching an optional group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupMatch {
    Matched,

    /// The group did not match and no tokens were consumed
    Skipped,
}

pub(super) struct Matcher<'t> {
    class: &'t CompiledObjectClass,
    tokens: &'t [DefinedSyntaxToken],

    /// Index of the next unmatched token
    position: usize,

    /// Settings bound so far, in the order they were written
    bindings: Vec<(FieldId, Spanned<Setting>)>,

    /// Every literal of the grammar, a word that is one of these is never read
    /// as a setting
    literals: HashSet<&'t str>,

    /// Location reported when the object ends too early
    end: Span,
}

impl<'t> Matcher<'t> {
    pub(super) fn new(
        class: &'t CompiledObjectClass,
        grammar: &'t SyntaxGrammar,
        tokens: &'t [DefinedSyntaxToken],
        end: Span,
    ) -> Self {
        Matcher {
            class,
            tokens,
            position: 0,
            bindings: vec![],
            literals: grammar.literals(),
            end,
        }
    }

    /// Match every token of the object, returning the setting bound to each
    /// field found
    pub(super) fn run(
        mut self,
        grammar: &SyntaxGrammar,
    ) -> Result<Vec<(FieldId, Spanned<Setting>)>> {
        self.sequence(grammar.elements(), false)?;

        if let Some(tok) = self.tokens.get(self.position) {
            let last = self.tokens.last().map(|t| t.span()).unwrap_or(tok.span());
            return Err(AnalysisError::UnexpectedData {
                span: tok.span().to(last),
            });
        }

        Ok(self.bindings)
    }

    /// Match a sequence of grammar elements.  Within an optional group, a
    /// mismatch before anything has been accepted skips the whole group
    /// without consuming any tokens.
    fn sequence(&mut self, elements: &[SyntaxElement], optional: bool) -> Result<GroupMatch> {
        let tokens = self.tokens;
        let start = (self.position, self.bindings.len());
        let mut accepted = false;
        let mut has_field = false;

        for element in elements {
            match element {
                SyntaxElement::Literal(literal) => match tokens.get(self.position) {
                    Some(DefinedSyntaxToken::Literal(tok)) if tok.value == *literal => {
                        self.position += 1;
                        accepted = true;
                    }
                    found => {
                        if optional && !accepted {
                            self.restore(start);
                            trace!(literal = %literal, "skipped optional group");
                            return Ok(GroupMatch::Skipped);
                        }
                        return Err(self.mismatch(format!("`{literal}`"), found));
                    }
                },
                SyntaxElement::Field(id) => match self.setting() {
                    Some(setting) => {
                        self.position += 1;
                        self.bindings.push((*id, setting));
                        accepted = true;
                        has_field = true;
                    }
                    None => {
                        if optional && !accepted {
                            self.restore(start);
                            trace!(field = ?id, "skipped optional group");
                            return Ok(GroupMatch::Skipped);
                        }
                        let expected = match self.class.field_by_id(*id) {
                            Some(field) => format!("a setting for `&{}`", field.name),
                            None => "a setting".to_string(),
                        };
                        return Err(self.mismatch(expected, tokens.get(self.position)));
                    }
                },
                SyntaxElement::Group(group) => {
                    if self.sequence(group, true)? == GroupMatch::Matched {
                        accepted = true;
                        has_field = true;
                    }
                }
            }
        }

        if optional && !accepted {
            return Ok(GroupMatch::Skipped);
        }
        if optional && !has_field {
            let span = match tokens.get(start.0) {
                Some(tok) => tok.span(),
                None => self.end,
            };
            return Err(AnalysisError::Internal {
                message: "optional group matched without setting a field",
                span,
            });
        }

        Ok(GroupMatch::Matched)
    }

    /// The next token, if it can be bound to a field.  Words that are not
    /// literals of the grammar are upper case references.
    fn setting(&self) -> Option<Spanned<Setting>> {
        match self.tokens.get(self.position)? {
            DefinedSyntaxToken::Setting(setting) => Some(setting.clone()),
            DefinedSyntaxToken::Literal(word)
                if word.value != "," && !self.literals.contains(word.value.as_str()) =>
            {
                Some(Parser::literal_as_type(word.clone()))
            }
            DefinedSyntaxToken::Literal(_) => None,
        }
    }

    fn restore(&mut self, (position, bindings): (usize, usize)) {
        self.position = position;
        self.bindings.truncate(bindings);
    }

    fn mismatch(&self, expected: String, found: Option<&DefinedSyntaxToken>) -> AnalysisError {
        match found {
            Some(tok) => AnalysisError::SyntaxMismatch {
                expected,
                found: tok.describe(),
                span: tok.span(),
            },
            None => AnalysisError::MissingSyntaxToken {
                expected,
                span: self.end,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::{AnalysisError, FieldValue, Model},
        compiler::AsnCompiler,
    };

    const CLASS: &str = "
        C ::= CLASS {
            &id INTEGER UNIQUE,
            &Type OPTIONAL,
            &name IA5String OPTIONAL,
            &flag BOOLEAN DEFAULT FALSE
        } WITH SYNTAX { ID &id [TYPE &Type [NAME &name]] [FLAG &flag] }
    ";

    fn compile(object: &str) -> Result<Model, AnalysisError> {
        let mut compiler = AsnCompiler::new();
        let source = format!("M DEFINITIONS ::= BEGIN {CLASS} obj C ::= {object} END");
        compiler.add_file("test.asn1".to_string(), source).unwrap();
        compiler.analysis()
    }

    fn field(model: &Model, name: &str) -> Option<String> {
        let object = model.module("M").unwrap().table().object("obj").unwrap();
        object.field(name).map(|v: &FieldValue| v.to_string())
    }

    #[test]
    fn all_groups() {
        let model = compile(r#"{ ID 1 TYPE BOOLEAN NAME "x" FLAG TRUE }"#).unwrap();
        assert_eq!(field(&model, "id").as_deref(), Some("1"));
        assert_eq!(field(&model, "Type").as_deref(), Some("BOOLEAN"));
        assert_eq!(field(&model, "name").as_deref(), Some("\"x\""));
        assert_eq!(field(&model, "flag").as_deref(), Some("TRUE"));
    }

    #[test]
    fn skipped_groups() {
        let model = compile("{ ID 1 FLAG TRUE }").unwrap();
        assert_eq!(field(&model, "Type"), None);
        assert_eq!(field(&model, "name"), None);

        let model = compile("{ ID 1 TYPE NULL }").unwrap();
        assert_eq!(field(&model, "Type").as_deref(), Some("NULL"));
        assert_eq!(field(&model, "flag").as_deref(), Some("FALSE"));
    }

    #[test]
    fn upper_case_reference_setting() {
        let mut compiler = AsnCompiler::new();
        let source = format!(
            "M DEFINITIONS ::= BEGIN {CLASS} MY-TYPE ::= INTEGER obj C ::= {{ ID 1 TYPE MY-TYPE }} END"
        );
        compiler.add_file("test.asn1".to_string(), source).unwrap();
        let model = compiler.analysis().unwrap();
        assert_eq!(field(&model, "Type").as_deref(), Some("MY-TYPE"));
    }

    #[test]
    fn group_of_groups() {
        let mut compiler = AsnCompiler::new();
        let source = "M DEFINITIONS ::= BEGIN
            D ::= CLASS { &a INTEGER OPTIONAL, &b INTEGER OPTIONAL }
                WITH SYNTAX { [[A &a] [B &b]] }
            obj D ::= { B 2 }
            none D ::= { }
        END";
        compiler.add_file("test.asn1".to_string(), source.to_string()).unwrap();
        let model = compiler.analysis().unwrap();

        let table = model.module("M").unwrap().table();
        let obj = table.object("obj").unwrap();
        assert!(obj.field("a").is_none());
        assert_eq!(obj.field("b").map(|v| v.to_string()).as_deref(), Some("2"));
        assert!(table.object("none").unwrap().field("b").is_none());
    }

    #[test]
    fn literal_mismatch() {
        let err = compile("{ IDENT 1 }").unwrap_err();
        assert!(matches!(err, AnalysisError::SyntaxMismatch { .. }));
    }

    #[test]
    fn missing_token() {
        let err = compile("{ ID }").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingSyntaxToken { .. }));
    }

    #[test]
    fn partial_group_is_an_error() {
        let err = compile("{ ID 1 TYPE }").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingSyntaxToken { .. }));
    }

    #[test]
    fn trailing_data() {
        let err = compile("{ ID 1 FLAG TRUE EXTRA }").unwrap_err();
        assert!(matches!(err, AnalysisError::UnexpectedData { .. }));
        assert_eq!(err.to_string(), "unexpected data in defined syntax");
    }

    #[test]
    fn groups_out_of_order() {
        let err = compile("{ ID 1 FLAG TRUE TYPE BOOLEAN }").unwrap_err();
        assert!(matches!(err, AnalysisError::UnexpectedData { .. }));
    }
}
