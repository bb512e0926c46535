use crate::diagnostic::Span;

use super::{value::Reference, value::Setting, value::Value, Spanned};

/// The contents of the braces of an object definition
#[derive(Debug, Clone)]
pub struct ObjectDefnNode {
    pub defn: ObjectDefn,

    /// Location of the whole definition, including the braces
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ObjectDefn {
    /// `{ &field value, &field2 value2 }`
    Default(Vec<FieldSetting>),

    /// Tokens to be matched against the `WITH SYNTAX` grammar of the class
    Defined(Vec<DefinedSyntaxToken>),
}

/// A single `&field setting` pair of a default syntax object
#[derive(Debug, Clone)]
pub struct FieldSetting {
    /// Name of the field, without the leading `&`
    pub field: Spanned<String>,
    pub setting: Spanned<Setting>,
}

/// A token within a defined syntax object
#[derive(Debug, Clone)]
pub enum DefinedSyntaxToken {
    /// A word or a comma.  A word could also be an upper case reference used
    /// as a setting, that is decided when the object is matched.
    Literal(Spanned<String>),
    Setting(Spanned<Setting>),
}

/// The contents of the braces of an object set
/// ```asn1
/// ObjectSetSpec ::= Elements ("|" Elements)* ("," "...")?
/// ```
#[derive(Debug, Clone)]
pub struct ObjectSetSpec {
    pub elements: Vec<ObjectSetElement>,
    pub extensible: bool,
}

#[derive(Debug, Clone)]
pub enum ObjectSetElement {
    /// Lower case for an object, upper case for an object set
    Reference(Reference),

    /// An object defined in place
    Defn(ObjectDefnNode),
}

/// The contents of the braces of a value set
#[derive(Debug, Clone)]
pub struct ValueSetSpec {
    pub values: Vec<Spanned<Value>>,
    pub extensible: bool,
}

impl DefinedSyntaxToken {
    /// Location of the token
    pub fn span(&self) -> Span {
        match self {
            DefinedSyntaxToken::Literal(l) => l.span,
            DefinedSyntaxToken::Setting(s) => s.span,
        }
    }

    /// Short description of the token, used in errors
    pub fn describe(&self) -> String {
        match self {
            DefinedSyntaxToken::Literal(l) => format!("`{}`", l.value),
            DefinedSyntaxToken::Setting(s) => s.value.describe(),
        }
    }
}
