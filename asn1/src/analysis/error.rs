use std::fmt::Display;

use crate::{
    diagnostic::{Diagnostic, Label, Span},
    parser::ParserError,
};

/// Any error that can be produced while analysing the parsed modules.  The
/// first error found aborts the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A literal in a `WITH SYNTAX` grammar is a reserved word
    ReservedWordLiteral { literal: String, span: Span },

    /// A field is referenced more than once in a `WITH SYNTAX` grammar
    DuplicateFieldInSyntax { field: String, span: Span },

    /// A `WITH SYNTAX` grammar references a field the class does not have
    UndefinedFieldInSyntax {
        field: String,
        class: String,
        span: Span,
    },

    /// A literal could also be the start of a preceding optional group
    AmbiguousLiteral { literal: String, span: Span },

    /// An optional group of a `WITH SYNTAX` grammar contains no field
    EmptyOptionalGroup { span: Span },

    /// An optional group has literals of its own but only sets fields inside
    /// nested optional groups
    GroupLiteralWithoutField { literal: String, span: Span },

    /// A mandatory field can only be set by an optional group
    MandatoryFieldInOptionalGroup { field: String, span: Span },

    /// Mandatory fields that cannot be set using the `WITH SYNTAX` grammar
    MandatoryFieldsNotInSyntax {
        fields: Vec<String>,
        class: String,
        span: Span,
    },

    /// A `UNIQUE` field also has a default value
    UniqueWithDefault { field: String, span: Span },

    /// An object (set) field of the class being defined is not optional
    SelfReferenceNotOptional {
        field: String,
        class: String,
        span: Span,
    },

    /// A variable type field governed by a field of a field, e.g. `&obj.&Type`
    NestedFieldReferenceUnsupported { field: String, span: Span },

    /// A class declares two fields with the same name
    DuplicateField { field: String, span: Span },

    /// The governing field of a variable type field does not exist
    UndefinedGoverningField {
        field: String,
        governor: String,
        span: Span,
    },

    /// The governing field of a variable type field is not a type field
    GoverningFieldNotTypeField {
        field: String,
        governor: String,
        span: Span,
    },

    /// A variable type field has a default, but its governing field does not
    GoverningFieldWithoutDefault {
        field: String,
        governor: String,
        span: Span,
    },

    /// A token of a defined syntax object does not match the grammar
    SyntaxMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A defined syntax object ended before the grammar was complete
    MissingSyntaxToken { expected: String, span: Span },

    /// Tokens left over after matching a defined syntax object
    UnexpectedData { span: Span },

    /// An object does not set a field that is neither optional nor defaulted
    MandatoryField {
        field: String,
        class: String,
        span: Span,
    },

    /// An object sets a field its class does not have
    UndefinedField {
        field: String,
        class: String,
        span: Span,
    },

    /// An object sets the same field twice
    DuplicateFieldSetting { field: String, span: Span },

    /// A defined syntax object for a class without a `WITH SYNTAX` grammar
    NoDefinedSyntax { class: String, span: Span },

    /// An object or object set is of a different class than required
    ClassMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A formal parameter is never used in the parameterized definition
    UnusedParameter {
        parameter: String,
        assignment: String,
        span: Span,
    },

    /// The wrong number of actual parameters were provided
    ParameterCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A setting is not the kind of thing required by its field, e.g. a
    /// value given for a type field
    SettingKindMismatch {
        field: String,
        expected: String,
        found: String,
        span: Span,
    },

    /// A variable type field is set, but the type governing it is not
    UnboundGoverningField {
        field: String,
        governor: String,
        span: Span,
    },

    /// A value does not match its governing type
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// The name is not an object class
    UndefinedClass { name: String, span: Span },

    /// The name is not defined, or imported into the module
    UndefinedReference { name: String, span: Span },

    /// The name refers to the wrong kind of thing, e.g. a value used as a type
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    /// Compiling the assignment requires the assignment itself
    CyclicReference { name: String, span: Span },

    /// The name is assigned twice within one module
    DuplicateAssignment { name: String, span: Span },

    /// Two modules have the same name
    DuplicateModule { name: String, span: Span },

    /// An import or qualified reference to a module that was not provided
    UnknownModule { name: String, span: Span },

    /// A braced value could not be parsed once its kind was known
    Parse(ParserError),

    /// Valid ASN.1 that is not supported by this compiler
    Unsupported { feature: &'static str, span: Span },

    /// Internal compiler consistency check failed
    Internal { message: &'static str, span: Span },
}

/// Broad category of an analysis error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// An object class is ill-formed
    Definition,

    /// An object is ill-formed
    ObjectDefinition,

    /// A name, type or value could not be resolved
    Resolution,

    /// A braced value could not be parsed
    Syntax,

    /// The compiler is in an inconsistent state, or the input is unsupported
    Internal,
}

pub type Result<T = (), E = AnalysisError> = std::result::Result<T, E>;

impl From<ParserError> for AnalysisError {
    fn from(value: ParserError) -> Self {
        AnalysisError::Parse(value)
    }
}

impl AnalysisError {
    /// The category of the error
    pub fn category(&self) -> ErrorCategory {
        use AnalysisError::*;

        match self {
            ReservedWordLiteral { .. }
            | DuplicateFieldInSyntax { .. }
            | UndefinedFieldInSyntax { .. }
            | AmbiguousLiteral { .. }
            | EmptyOptionalGroup { .. }
            | GroupLiteralWithoutField { .. }
            | MandatoryFieldInOptionalGroup { .. }
            | MandatoryFieldsNotInSyntax { .. }
            | UniqueWithDefault { .. }
            | SelfReferenceNotOptional { .. }
            | NestedFieldReferenceUnsupported { .. }
            | DuplicateField { .. }
            | UndefinedGoverningField { .. }
            | GoverningFieldWithoutDefault { .. } => ErrorCategory::Definition,

            SyntaxMismatch { .. }
            | MissingSyntaxToken { .. }
            | UnexpectedData { .. }
            | MandatoryField { .. }
            | UndefinedField { .. }
            | DuplicateFieldSetting { .. }
            | NoDefinedSyntax { .. }
            | ClassMismatch { .. }
            | UnusedParameter { .. }
            | ParameterCountMismatch { .. }
            | SettingKindMismatch { .. }
            | UnboundGoverningField { .. } => ErrorCategory::ObjectDefinition,

            GoverningFieldNotTypeField { .. }
            | TypeMismatch { .. }
            | UndefinedClass { .. }
            | UndefinedReference { .. }
            | WrongKind { .. }
            | CyclicReference { .. }
            | DuplicateAssignment { .. }
            | DuplicateModule { .. }
            | UnknownModule { .. } => ErrorCategory::Resolution,

            Parse(_) => ErrorCategory::Syntax,

            Unsupported { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Location the error was found at, `None` for syntax errors, which carry
    /// their own location
    pub fn span(&self) -> Option<Span> {
        use AnalysisError::*;

        match self {
            ReservedWordLiteral { span, .. }
            | DuplicateFieldInSyntax { span, .. }
            | UndefinedFieldInSyntax { span, .. }
            | AmbiguousLiteral { span, .. }
            | EmptyOptionalGroup { span }
            | GroupLiteralWithoutField { span, .. }
            | MandatoryFieldInOptionalGroup { span, .. }
            | MandatoryFieldsNotInSyntax { span, .. }
            | UniqueWithDefault { span, .. }
            | SelfReferenceNotOptional { span, .. }
            | NestedFieldReferenceUnsupported { span, .. }
            | DuplicateField { span, .. }
            | UndefinedGoverningField { span, .. }
            | GoverningFieldNotTypeField { span, .. }
            | GoverningFieldWithoutDefault { span, .. }
            | SyntaxMismatch { span, .. }
            | MissingSyntaxToken { span, .. }
            | UnexpectedData { span }
            | MandatoryField { span, .. }
            | UndefinedField { span, .. }
            | DuplicateFieldSetting { span, .. }
            | NoDefinedSyntax { span, .. }
            | ClassMismatch { span, .. }
            | UnusedParameter { span, .. }
            | ParameterCountMismatch { span, .. }
            | SettingKindMismatch { span, .. }
            | UnboundGoverningField { span, .. }
            | TypeMismatch { span, .. }
            | UndefinedClass { span, .. }
            | UndefinedReference { span, .. }
            | WrongKind { span, .. }
            | CyclicReference { span, .. }
            | DuplicateAssignment { span, .. }
            | DuplicateModule { span, .. }
            | UnknownModule { span, .. }
            | Unsupported { span, .. }
            | Internal { span, .. } => Some(*span),
            Parse(_) => None,
        }
    }

    /// Unique error code for the error
    fn code(&self) -> &'static str {
        use AnalysisError::*;

        match self {
            ReservedWordLiteral { .. } => "A001",
            DuplicateFieldInSyntax { .. } => "A002",
            UndefinedFieldInSyntax { .. } => "A003",
            AmbiguousLiteral { .. } => "A004",
            EmptyOptionalGroup { .. } => "A005",
            MandatoryFieldInOptionalGroup { .. } => "A006",
            MandatoryFieldsNotInSyntax { .. } => "A007",
            UniqueWithDefault { .. } => "A008",
            SelfReferenceNotOptional { .. } => "A009",
            NestedFieldReferenceUnsupported { .. } => "A010",
            DuplicateField { .. } => "A011",
            UndefinedGoverningField { .. } => "A012",
            GoverningFieldNotTypeField { .. } => "A013",
            GoverningFieldWithoutDefault { .. } => "A014",
            GroupLiteralWithoutField { .. } => "A015",
            SyntaxMismatch { .. } => "A101",
            MissingSyntaxToken { .. } => "A102",
            UnexpectedData { .. } => "A103",
            MandatoryField { .. } => "A104",
            UndefinedField { .. } => "A105",
            DuplicateFieldSetting { .. } => "A106",
            NoDefinedSyntax { .. } => "A107",
            ClassMismatch { .. } => "A108",
            UnusedParameter { .. } => "A109",
            ParameterCountMismatch { .. } => "A110",
            SettingKindMismatch { .. } => "A111",
            UnboundGoverningField { .. } => "A112",
            TypeMismatch { .. } => "A201",
            UndefinedClass { .. } => "A202",
            UndefinedReference { .. } => "A203",
            WrongKind { .. } => "A204",
            CyclicReference { .. } => "A205",
            DuplicateAssignment { .. } => "A206",
            DuplicateModule { .. } => "A207",
            UnknownModule { .. } => "A208",
            Parse(_) => "A300",
            Unsupported { .. } => "A901",
            Internal { .. } => "A999",
        }
    }
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use AnalysisError::*;

        match self {
            ReservedWordLiteral { literal, .. } => {
                write!(f, "`{literal}` is a reserved word and cannot be used as a literal")
            }
            DuplicateFieldInSyntax { field, .. } => {
                write!(f, "field `&{field}` is used more than once in the syntax")
            }
            UndefinedFieldInSyntax { field, class, .. } => {
                write!(f, "class `{class}` has no field `&{field}`")
            }
            AmbiguousLiteral { literal, .. } => {
                write!(f, "literal `{literal}` is illegal at this position")
            }
            EmptyOptionalGroup { .. } => {
                write!(f, "optional group does not contain any field")
            }
            GroupLiteralWithoutField { literal, .. } => write!(
                f,
                "literal `{literal}` can be matched without setting a field of its optional group"
            ),
            MandatoryFieldInOptionalGroup { field, .. } => {
                write!(f, "mandatory field `&{field}` is inside an optional group")
            }
            MandatoryFieldsNotInSyntax { fields, class, .. } => {
                write!(
                    f,
                    "not all mandatory fields are defined in the syntax of `{class}`, missing "
                )?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "`&{field}`")?;
                }
                Ok(())
            }
            UniqueWithDefault { field, .. } => {
                write!(f, "unique field `&{field}` cannot have a default")
            }
            SelfReferenceNotOptional { field, class, .. } => write!(
                f,
                "field `&{field}` refers to its own class `{class}` and must be optional"
            ),
            NestedFieldReferenceUnsupported { field, .. } => write!(
                f,
                "field `&{field}` is governed by a nested field reference, which is not supported"
            ),
            DuplicateField { field, .. } => write!(f, "field `&{field}` is defined more than once"),
            UndefinedGoverningField {
                field, governor, ..
            } => write!(
                f,
                "field `&{governor}` governing `&{field}` is not defined"
            ),
            GoverningFieldNotTypeField {
                field, governor, ..
            } => write!(
                f,
                "field `&{governor}` governing `&{field}` is not a type field"
            ),
            GoverningFieldWithoutDefault {
                field, governor, ..
            } => write!(
                f,
                "field `&{field}` has a default, but its governing field `&{governor}` does not"
            ),
            SyntaxMismatch {
                expected, found, ..
            } => write!(f, "expected {expected}, found {found}"),
            MissingSyntaxToken { expected, .. } => {
                write!(f, "expected {expected}, found the end of the object")
            }
            UnexpectedData { .. } => write!(f, "unexpected data in defined syntax"),
            MandatoryField { field, class, .. } => write!(
                f,
                "field is mandatory: `&{field}` of class `{class}` must be set"
            ),
            UndefinedField { field, class, .. } => {
                write!(f, "class `{class}` has no field `&{field}`")
            }
            DuplicateFieldSetting { field, .. } => {
                write!(f, "field `&{field}` is set more than once")
            }
            NoDefinedSyntax { class, .. } => write!(
                f,
                "class `{class}` has no `WITH SYNTAX` grammar, use `{{ &field value, ... }}`"
            ),
            ClassMismatch {
                expected, found, ..
            } => write!(
                f,
                "expected an object of class `{expected}`, found one of class `{found}`"
            ),
            UnusedParameter {
                parameter,
                assignment,
                ..
            } => write!(
                f,
                "parameter `{parameter}` of `{assignment}` is never used"
            ),
            ParameterCountMismatch {
                name,
                expected,
                found,
                ..
            } => write!(
                f,
                "`{name}` takes {expected} parameters, but {found} were supplied"
            ),
            SettingKindMismatch {
                field,
                expected,
                found,
                ..
            } => write!(f, "`{field}` requires {expected}, found {found}"),
            UnboundGoverningField {
                field, governor, ..
            } => write!(
                f,
                "`&{field}` is set, but its governing field `&{governor}` is not"
            ),
            TypeMismatch {
                expected, found, ..
            } => write!(f, "expected a value of type {expected}, found {found}"),
            UndefinedClass { name, .. } => write!(f, "`{name}` is not an object class"),
            UndefinedReference { name, .. } => write!(f, "`{name}` is not defined"),
            WrongKind {
                name,
                expected,
                found,
                ..
            } => write!(f, "expected {expected}, but `{name}` is {found}"),
            CyclicReference { name, .. } => write!(f, "`{name}` depends on itself"),
            DuplicateAssignment { name, .. } => write!(f, "`{name}` is defined more than once"),
            DuplicateModule { name, .. } => {
                write!(f, "module `{name}` is defined more than once")
            }
            UnknownModule { name, .. } => write!(f, "module `{name}` is not defined"),
            Parse(err) => write!(f, "{err}"),
            Unsupported { feature, .. } => write!(f, "{feature} are not supported"),
            Internal { message, .. } => write!(f, "internal compiler error: {message}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<AnalysisError> for Diagnostic {
    fn from(value: AnalysisError) -> Self {
        let span = match (&value, value.span()) {
            (AnalysisError::Parse(err), _) => return err.clone().into(),
            (_, Some(span)) => span,
            (_, None) => return Diagnostic::error(value.code()).name(value.to_string()),
        };

        let name = match value.category() {
            ErrorCategory::Definition => "Invalid object class",
            ErrorCategory::ObjectDefinition => "Invalid object definition",
            ErrorCategory::Resolution => "Unable to resolve reference",
            ErrorCategory::Syntax => "Syntax error",
            ErrorCategory::Internal => "Unable to compile",
        };

        Diagnostic::error(value.code())
            .name(name)
            .label(Label::new(value.to_string()).at(span))
    }
}
