use crate::diagnostic::Span;

use super::{ty::Type, value::Setting, value::Value, Spanned};

/// The body of an object class assignment
/// ```asn1
/// ObjectClassDefn ::= CLASS "{" FieldSpec "," + "}" WithSyntaxSpec?
/// ```
#[derive(Debug, Clone)]
pub struct ObjectClassDefn {
    /// Every field, in declaration order
    pub fields: Vec<FieldSpecNode>,

    /// The `WITH SYNTAX` grammar, if present
    pub syntax: Option<Spanned<Vec<TokenOrGroup>>>,

    /// Location of the whole definition
    pub span: Span,
}

/// A single field of an object class
#[derive(Debug, Clone)]
pub struct FieldSpecNode {
    /// Name of the field, without the leading `&`
    pub name: Spanned<String>,

    pub kind: FieldSpecKind,

    /// Location of the whole field spec
    pub span: Span,
}

/// The syntactic forms of a field spec.  A field with a governor could either
/// be a fixed type value (set) field or an object (set) field, the two can only
/// be told apart by checking whether the governor names an object class.
#[derive(Debug, Clone)]
pub enum FieldSpecKind {
    /// `&Type [OPTIONAL | DEFAULT Type]`
    Type { optionality: Optionality<Spanned<Type>> },

    /// `&value Governor [UNIQUE] [OPTIONAL | DEFAULT Value]`
    FixedTypeValueOrObject {
        governor: Spanned<Type>,
        unique: Option<Span>,
        optionality: Optionality<Spanned<Value>>,
    },

    /// `&value &Field [OPTIONAL | DEFAULT Value]`
    VariableTypeValue {
        field_name: Vec<Spanned<String>>,
        optionality: Optionality<Spanned<Value>>,
    },

    /// `&Set Governor [OPTIONAL | DEFAULT { ... }]`
    FixedTypeValueSetOrObjectSet {
        governor: Spanned<Type>,
        optionality: Optionality<Spanned<Setting>>,
    },

    /// `&Set &Field [OPTIONAL | DEFAULT { ... }]`
    VariableTypeValueSet {
        field_name: Vec<Spanned<String>>,
        optionality: Optionality<Spanned<Setting>>,
    },
}

/// Whether a field must be supplied by every object
#[derive(Debug, Clone)]
pub enum Optionality<T> {
    Mandatory,
    Optional,
    Default(T),
}

/// A single element of a `WITH SYNTAX` grammar
#[derive(Debug, Clone)]
pub enum TokenOrGroup {
    Required(RequiredToken),

    /// `[ ... ]`, may be left out of an object definition
    Group(Spanned<Vec<TokenOrGroup>>),
}

/// A token that must be present if the group containing it is present
#[derive(Debug, Clone)]
pub enum RequiredToken {
    /// A word or a comma
    Literal(Spanned<String>),

    /// A primitive field name, without the leading `&`
    Field(Spanned<String>),
}
