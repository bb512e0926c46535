//! Validation of the `WITH SYNTAX` grammar of an object class.  The grammar
//! must be usable with a single token of lookahead: on seeing a literal, it
//! has to be clear whether it starts an optional group or continues past it.

use std::collections::HashSet;

use crate::{
    ast::{RequiredToken, Spanned, TokenOrGroup},
    token::is_literal_reserved,
};

use super::{
    class::{CompiledObjectClass, FieldId},
    error::AnalysisError,
    Result,
};

/// A validated `WITH SYNTAX` grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxGrammar {
    elements: Vec<SyntaxElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    /// A word or a comma that must be written as is
    Literal(String),

    /// A field setting
    Field(FieldId),

    /// An optional group, `[ ... ]`
    Group(Vec<SyntaxElement>),
}

impl SyntaxGrammar {
    /// Check a grammar against the fields of its class
    pub(super) fn new(
        syntax: &Spanned<Vec<TokenOrGroup>>,
        class: &CompiledObjectClass,
    ) -> Result<Self> {
        let mut validator = Validator {
            class,
            defined: HashSet::new(),
        };

        let mut leaders = HashSet::new();
        let (elements, _) = validator.sequence(&syntax.value, &mut leaders, false)?;

        let missing: Vec<_> = class
            .enumerate()
            .filter(|(id, field)| field.is_mandatory() && !validator.defined.contains(id))
            .map(|(_, field)| field.name.clone())
            .collect();

        if !missing.is_empty() {
            return Err(AnalysisError::MandatoryFieldsNotInSyntax {
                fields: missing,
                class: class.name().to_string(),
                span: syntax.span,
            });
        }

        Ok(SyntaxGrammar { elements })
    }

    pub fn elements(&self) -> &[SyntaxElement] {
        &self.elements
    }

    /// Every literal used anywhere in the grammar
    pub fn literals(&self) -> HashSet<&str> {
        fn collect<'a>(elements: &'a [SyntaxElement], out: &mut HashSet<&'a str>) {
            for element in elements {
                match element {
                    SyntaxElement::Literal(l) => {
                        out.insert(l);
                    }
                    SyntaxElement::Field(_) => (),
                    SyntaxElement::Group(g) => collect(g, out),
                }
            }
        }

        let mut literals = HashSet::new();
        collect(&self.elements, &mut literals);
        literals
    }
}

struct Validator<'c> {
    class: &'c CompiledObjectClass,

    /// Fields referenced so far
    defined: HashSet<FieldId>,
}

impl Validator<'_> {
    /// Validate one level of the grammar.  `leaders` holds the literals that
    /// start optional groups directly before the current position, a literal
    /// in that set could not be told apart from the start of those groups.
    /// Field settings leave the set unchanged.  Returns whether the level
    /// contains a field.
    fn sequence(
        &mut self,
        tokens: &[TokenOrGroup],
        leaders: &mut HashSet<String>,
        optional: bool,
    ) -> Result<(Vec<SyntaxElement>, bool)> {
        let mut elements = Vec::with_capacity(tokens.len());
        let mut has_field = false;
        let mut direct_field = false;
        let mut first_literal = None;

        for token in tokens {
            match token {
                TokenOrGroup::Required(RequiredToken::Literal(literal)) => {
                    if literal.value != "," && is_literal_reserved(&literal.value) {
                        return Err(AnalysisError::ReservedWordLiteral {
                            literal: literal.value.clone(),
                            span: literal.span,
                        });
                    }
                    if leaders.contains(&literal.value) {
                        return Err(AnalysisError::AmbiguousLiteral {
                            literal: literal.value.clone(),
                            span: literal.span,
                        });
                    }

                    leaders.clear();
                    first_literal.get_or_insert(literal);
                    elements.push(SyntaxElement::Literal(literal.value.clone()));
                }
                TokenOrGroup::Required(RequiredToken::Field(name)) => {
                    let Some((id, field)) = self.class.field(&name.value) else {
                        return Err(AnalysisError::UndefinedFieldInSyntax {
                            field: name.value.clone(),
                            class: self.class.name().to_string(),
                            span: name.span,
                        });
                    };

                    if !self.defined.insert(id) {
                        return Err(AnalysisError::DuplicateFieldInSyntax {
                            field: name.value.clone(),
                            span: name.span,
                        });
                    }
                    if optional && field.is_mandatory() {
                        return Err(AnalysisError::MandatoryFieldInOptionalGroup {
                            field: name.value.clone(),
                            span: name.span,
                        });
                    }

                    has_field = true;
                    direct_field = true;
                    elements.push(SyntaxElement::Field(id));
                }
                TokenOrGroup::Group(group) => {
                    let mut inner = leaders.clone();
                    let (group_elements, group_has_field) =
                        self.sequence(&group.value, &mut inner, true)?;

                    if !group_has_field {
                        return Err(AnalysisError::EmptyOptionalGroup { span: group.span });
                    }

                    first_literals(&group_elements, leaders);
                    has_field = true;
                    elements.push(SyntaxElement::Group(group_elements));
                }
            }
        }

        // The nested groups can all be skipped after the group's own literals
        // were matched, leaving the group matched without a field.
        if optional && !direct_field {
            if let Some(literal) = first_literal {
                return Err(AnalysisError::GroupLiteralWithoutField {
                    literal: literal.value.clone(),
                    span: literal.span,
                });
            }
        }

        Ok((elements, has_field))
    }
}

/// Add the literals that could be the first token matched by a sequence
fn first_literals(elements: &[SyntaxElement], out: &mut HashSet<String>) {
    for element in elements {
        match element {
            SyntaxElement::Literal(literal) => {
                out.insert(literal.clone());
                return;
            }
            SyntaxElement::Field(_) => return,
            SyntaxElement::Group(group) => first_literals(group, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::{AnalysisError, ErrorCategory, Model},
        compiler::AsnCompiler,
    };

    fn compile(class: &str) -> Result<Model, AnalysisError> {
        let mut compiler = AsnCompiler::new();
        let source = format!("M DEFINITIONS ::= BEGIN C ::= {class} END");
        compiler.add_file("test.asn1".to_string(), source).unwrap();
        compiler.analysis()
    }

    #[test]
    fn valid_grammar() {
        let model = compile(
            "CLASS { &id INTEGER UNIQUE, &Type OPTIONAL, &desc IA5String OPTIONAL }
            WITH SYNTAX { ID &id [TYPE &Type] [DESCRIPTION &desc] }",
        )
        .unwrap();

        let class = model.module("M").unwrap().table().class("C").unwrap();
        let syntax = class.syntax().unwrap();
        assert_eq!(syntax.elements().len(), 4);
        assert_eq!(syntax.literals().len(), 3);
    }

    #[test]
    fn reserved_literal() {
        let err = compile("CLASS { &id INTEGER } WITH SYNTAX { INTEGER &id }").unwrap_err();
        assert!(matches!(&err, AnalysisError::ReservedWordLiteral { literal, .. } if literal == "INTEGER"));
    }

    #[test]
    fn comma_literal() {
        compile("CLASS { &a INTEGER, &b INTEGER } WITH SYNTAX { A &a , B &b }").unwrap();
    }

    #[test]
    fn adjacent_groups_with_same_leader() {
        let err = compile(
            "CLASS { &a INTEGER OPTIONAL, &b INTEGER OPTIONAL }
            WITH SYNTAX { [A &a] [A &b] }",
        )
        .unwrap_err();
        assert!(matches!(&err, AnalysisError::AmbiguousLiteral { literal, .. } if literal == "A"));
        assert!(err.to_string().contains("illegal at this position"));
    }

    #[test]
    fn literal_after_group_with_same_leader() {
        let err = compile(
            "CLASS { &a INTEGER OPTIONAL, &b INTEGER }
            WITH SYNTAX { [A &a] A &b }",
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::AmbiguousLiteral { .. }));
    }

    #[test]
    fn literal_clears_leaders() {
        compile(
            "CLASS { &a INTEGER OPTIONAL, &b INTEGER, &c INTEGER }
            WITH SYNTAX { [A &a] B &b A &c }",
        )
        .unwrap();
    }

    #[test]
    fn field_keeps_leaders() {
        let err = compile(
            "CLASS { &a INTEGER OPTIONAL, &b INTEGER, &c INTEGER }
            WITH SYNTAX { [A &a] &b A &c }",
        )
        .unwrap_err();
        assert!(matches!(&err, AnalysisError::AmbiguousLiteral { literal, .. } if literal == "A"));
        assert!(err.to_string().contains("illegal at this position"));
    }

    #[test]
    fn group_literal_without_field() {
        let err = compile("CLASS { &a INTEGER OPTIONAL } WITH SYNTAX { [[A &a] B] }").unwrap_err();
        assert!(
            matches!(&err, AnalysisError::GroupLiteralWithoutField { literal, .. } if literal == "B")
        );
        assert_eq!(err.category(), ErrorCategory::Definition);

        let err = compile("CLASS { &a INTEGER OPTIONAL } WITH SYNTAX { [B [A &a]] }").unwrap_err();
        assert!(matches!(err, AnalysisError::GroupLiteralWithoutField { .. }));

        compile("CLASS { &a INTEGER OPTIONAL } WITH SYNTAX { [[A &a]] }").unwrap();
    }

    #[test]
    fn nested_group_leaders() {
        let err = compile(
            "CLASS { &a INTEGER OPTIONAL, &b INTEGER OPTIONAL, &c INTEGER }
            WITH SYNTAX { [[A &a] B &b] A &c }",
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::AmbiguousLiteral { .. }));
    }

    #[test]
    fn empty_group() {
        let err = compile("CLASS { &a INTEGER } WITH SYNTAX { A &a [B] }").unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyOptionalGroup { .. }));
    }

    #[test]
    fn mandatory_in_group() {
        let err = compile("CLASS { &a INTEGER } WITH SYNTAX { [A &a] }").unwrap_err();
        assert!(matches!(&err, AnalysisError::MandatoryFieldInOptionalGroup { field, .. } if field == "a"));
    }

    #[test]
    fn duplicate_and_undefined_fields() {
        let err = compile("CLASS { &a INTEGER } WITH SYNTAX { A &a B &a }").unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateFieldInSyntax { .. }));

        let err = compile("CLASS { &a INTEGER } WITH SYNTAX { A &a B &b }").unwrap_err();
        assert!(matches!(&err, AnalysisError::UndefinedFieldInSyntax { field, .. } if field == "b"));
    }

    #[test]
    fn missing_mandatory_field() {
        let err = compile(
            "CLASS { &a INTEGER, &b BOOLEAN, &c INTEGER OPTIONAL }
            WITH SYNTAX { A &a }",
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            AnalysisError::MandatoryFieldsNotInSyntax { fields, .. } if fields == &["b"]
        ));
        assert!(err
            .to_string()
            .contains("not all mandatory fields are defined in the syntax"));
    }
}
