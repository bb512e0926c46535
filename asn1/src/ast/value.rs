use super::{ty::Type, Braced, Spanned};

/// Any value that can be written in an assignment or setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Null,
    Number(i64),

    /// Text of the string, with the quotes removed and escapes processed
    CString(String),

    /// Binary digits, without quotes or whitespace
    BString(String),

    /// Hexadecimal digits, without quotes or whitespace
    HString(String),

    /// `alternative : value`
    Choice {
        alternative: Spanned<String>,
        value: Box<Spanned<Value>>,
    },

    /// Reference to a value, an object, an enumeration item or a named number
    Reference(Reference),

    /// Any value within braces.  Interpreted once the governing type is known.
    Braced(Braced),
}

/// A name, optionally qualified by the module it was defined in, and
/// optionally applied to actual parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub module: Option<Spanned<String>>,
    pub name: Spanned<String>,
    pub actual_parameters: Option<Vec<Spanned<Setting>>>,
}

/// Anything that can be bound to a field of an object, or passed as an actual
/// parameter.  Types and values cannot always be told apart by the parser, so
/// analysis reinterprets a setting depending on the kind of the field it is
/// bound to (e.g. an upper case reference is a type, a value set or an object
/// set, and `NULL` is both a type and a value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Type(Type),
    Value(Value),
}

/// A single component of an object identifier value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidComponent {
    /// the non-integer label for the component, or a value reference
    pub name: Option<Spanned<String>>,

    /// the integer label for the component
    pub number: Option<Spanned<u64>>,
}

impl Value {
    /// Short description of the kind of value, used in type mismatch errors
    pub fn describe(&self) -> String {
        match self {
            Value::Boolean(_) => "a BOOLEAN value".to_string(),
            Value::Null => "NULL".to_string(),
            Value::Number(_) => "an INTEGER value".to_string(),
            Value::CString(_) => "a character string value".to_string(),
            Value::BString(_) => "a binary string value".to_string(),
            Value::HString(_) => "a hexadecimal string value".to_string(),
            Value::Choice { alternative, .. } => {
                format!("a CHOICE value with alternative `{}`", alternative.value)
            }
            Value::Reference(r) => format!("a reference to `{}`", r.name.value),
            Value::Braced(_) => "a braced value".to_string(),
        }
    }
}

impl Reference {
    /// Create an unqualified reference without parameters
    pub fn simple(name: Spanned<String>) -> Self {
        Reference {
            module: None,
            name,
            actual_parameters: None,
        }
    }
}

impl Setting {
    /// Short description of the kind of setting, used in errors
    pub fn describe(&self) -> String {
        match self {
            Setting::Type(Type::Reference(r)) => format!("a reference to `{}`", r.name.value),
            Setting::Type(_) => "a type".to_string(),
            Setting::Value(v) => v.describe(),
        }
    }
}
