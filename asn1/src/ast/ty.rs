use super::{value::Reference, value::Value, Spanned};

/// Any type that can be written in a type assignment, field spec or setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Boolean,
    Null,
    Integer(Vec<NamedNumber>),
    Real,
    Enumerated {
        items: Vec<NamedNumber>,
        extensible: bool,
    },
    BitString(Vec<NamedNumber>),
    OctetString,
    ObjectIdentifier,
    RelativeOid,
    CharacterString(StringKind),
    Sequence {
        components: Vec<Component>,
        extensible: bool,
    },
    Set {
        components: Vec<Component>,
        extensible: bool,
    },
    SequenceOf(Box<Spanned<Type>>),
    SetOf(Box<Spanned<Type>>),
    Choice {
        alternatives: Vec<Component>,
        extensible: bool,
    },

    /// `[APPLICATION 5] IMPLICIT Type`
    Tagged { tag: Tag, ty: Box<Spanned<Type>> },

    /// Reference to a type, object class, value set or object set
    Reference(Reference),

    /// `CLASS.&field`, the type of a field of an object class
    ClassField {
        class: Reference,
        field: Vec<Spanned<String>>,
    },

    /// Any type followed by a constraint.  Constraints are kept as source text
    /// as they are not evaluated.
    Constrained {
        ty: Box<Spanned<Type>>,
        constraint: Spanned<String>,
    },
}

/// The restricted character string types and the useful time types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StringKind {
    BmpString,
    GeneralString,
    GraphicString,
    IA5String,
    ISO646String,
    NumericString,
    PrintableString,
    TeletexString,
    T61String,
    UniversalString,
    UTF8String,
    VideotexString,
    VisibleString,
    GeneralizedTime,
    UTCTime,
    ObjectDescriptor,
}

/// `name(number)` within an integer, enumerated or bit string type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedNumber {
    pub name: Spanned<String>,

    /// Not present for enumeration items without explicit values
    pub number: Option<Spanned<i64>>,
}

/// A single component of a SEQUENCE, SET or CHOICE type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: Spanned<String>,
    pub ty: Spanned<Type>,
    pub optionality: ComponentOptionality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentOptionality {
    Mandatory,
    Optional,
    Default(Spanned<Value>),
}

/// A tag prefix on a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub number: u64,

    /// Was the tag marked `IMPLICIT` or `EXPLICIT`, `None` uses the module default
    pub implicit: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    Private,
    ContextSpecific,
}

impl StringKind {
    /// The ASN.1 name of the type
    pub fn name(self) -> &'static str {
        match self {
            StringKind::BmpString => "BMPString",
            StringKind::GeneralString => "GeneralString",
            StringKind::GraphicString => "GraphicString",
            StringKind::IA5String => "IA5String",
            StringKind::ISO646String => "ISO646String",
            StringKind::NumericString => "NumericString",
            StringKind::PrintableString => "PrintableString",
            StringKind::TeletexString => "TeletexString",
            StringKind::T61String => "T61String",
            StringKind::UniversalString => "UniversalString",
            StringKind::UTF8String => "UTF8String",
            StringKind::VideotexString => "VideotexString",
            StringKind::VisibleString => "VisibleString",
            StringKind::GeneralizedTime => "GeneralizedTime",
            StringKind::UTCTime => "UTCTime",
            StringKind::ObjectDescriptor => "ObjectDescriptor",
        }
    }
}
