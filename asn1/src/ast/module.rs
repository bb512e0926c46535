use super::{class::ObjectClassDefn, ty::Type, value::Value, Braced, Spanned};

/// A group of ASN.1 assignments and settings.
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    /// Identifier for the module
    pub name: Spanned<String>,

    /// Symbols imported from other modules
    pub imports: Vec<Import>,

    /// Every assignment in the module, in source order
    pub assignments: Vec<Assignment>,
}

/// A list of symbols imported from a single module
#[derive(Debug, Clone)]
pub struct Import {
    /// The imported names
    pub symbols: Vec<Spanned<String>>,

    /// The module the names are defined in
    pub module: Spanned<String>,
}

/// Any assignment statement `name ... ::= ...`
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Name being assigned to
    pub name: Spanned<String>,

    /// Formal parameters, if this is a parameterized assignment
    pub parameters: Option<Vec<Parameter>>,

    /// What is being assigned
    pub kind: AssignmentKind,
}

/// The right hand side of an assignment.  Several kinds of assignment are
/// syntactically identical, so those are only split up during analysis, once
/// it is known whether the governor is an object class.
#[derive(Debug, Clone)]
pub enum AssignmentKind {
    /// `Name ::= Type`, could also be an alias for an object class
    Type(Spanned<Type>),

    /// `name Type ::= Value`, could also be an object assignment
    Value {
        governor: Spanned<Type>,
        value: Spanned<Value>,
    },

    /// `Name Type ::= { ... }`, either a value set or an object set
    Set {
        governor: Spanned<Type>,
        set: Braced,
    },

    /// `NAME ::= CLASS { ... }`
    ObjectClass(ObjectClassDefn),
}

/// A single formal parameter of a parameterized assignment
/// ```asn1
/// Parameter ::= ParamGovernor ":" DummyReference | DummyReference
/// ```
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Type or class governing the parameter, not present for type parameters
    pub governor: Option<Spanned<Type>>,

    /// The name used for the parameter within the assignment
    pub dummy: Spanned<String>,
}

impl Assignment {
    /// Is this a parameterized assignment, that can only be compiled once
    /// actual parameters are supplied
    pub fn is_parameterized(&self) -> bool {
        self.parameters.is_some()
    }
}
