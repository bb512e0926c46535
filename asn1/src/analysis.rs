//! Name resolution and checking of ASN.1 modules, including compilation of
//! information object classes, objects and object sets.

mod class;
mod context;
mod environment;
mod error;
mod field;
mod matcher;
mod object;
mod object_set;
mod syntax;
mod table;
mod ty;
mod value;

pub(crate) use self::context::AnalysisContext;
pub use self::{
    class::{
        ClassRef, CompiledField, CompiledObjectClass, FieldId, FieldKind, FieldOptionality,
        FieldValue,
    },
    error::{AnalysisError, ErrorCategory, Result},
    object::CompiledObject,
    object_set::CompiledObjectSet,
    syntax::{SyntaxElement, SyntaxGrammar},
    table::{Symbol, SymbolTable},
    ty::{CompiledComponent, CompiledType},
    value::{CompiledValueSet, ResolvedValue, TypedValue},
};

/// The result of a successful analysis: every module with all of its
/// assignments compiled
#[derive(Debug, Clone)]
pub struct Model {
    modules: Vec<CompiledModule>,
}

#[derive(Debug, Clone)]
pub struct CompiledModule {
    name: String,
    table: SymbolTable,
}

impl Model {
    /// Every module, in the order they were defined
    pub fn modules(&self) -> &[CompiledModule] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&CompiledModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl CompiledModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }
}
