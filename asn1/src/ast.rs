//! Owned syntax tree produced by the parser.  Anything that cannot be
//! interpreted without knowing the types involved (mostly braced values) is
//! kept as a group of raw tokens and parsed again during analysis.

mod class;
mod module;
mod object;
mod ty;
mod value;

use crate::{diagnostic::Span, token::TokenBuffer};

pub use self::{
    class::{FieldSpecKind, FieldSpecNode, ObjectClassDefn, Optionality, RequiredToken, TokenOrGroup},
    module::{Assignment, AssignmentKind, Import, ModuleDefinition, Parameter},
    object::{
        DefinedSyntaxToken, FieldSetting, ObjectDefn, ObjectDefnNode, ObjectSetElement,
        ObjectSetSpec, ValueSetSpec,
    },
    ty::{Component, ComponentOptionality, NamedNumber, StringKind, Tag, TagClass, Type},
    value::{OidComponent, Reference, Setting, Value},
};

/// A syntax tree node along with the location it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

/// The contents of a `{ ... }` group, not including the braces themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Braced {
    /// All tokens between the braces, including any nested braces
    pub tokens: Vec<TokenBuffer>,

    /// Location of the whole group, including the braces
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Attach a location to a value
    pub fn new(value: T, span: Span) -> Self {
        Spanned { value, span }
    }

    /// Transform the value, keeping the same location
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }
}
