//! Front end for ASN.1 modules using the information object system: lexing,
//! parsing, name resolution and compilation of object classes, objects and
//! object sets.

#![forbid(unsafe_code)]

mod analysis;
mod ast;
mod codegen;
mod compiler;
mod diagnostic;
mod lexer;
mod parser;
mod token;
mod util;

pub use analysis::{
    AnalysisError, ClassRef, CompiledComponent, CompiledField, CompiledModule, CompiledObject,
    CompiledObjectClass, CompiledObjectSet, CompiledType, CompiledValueSet, ErrorCategory,
    FieldId, FieldKind, FieldOptionality, FieldValue, Model, ResolvedValue, Symbol, SymbolTable,
    SyntaxElement, SyntaxGrammar, TypedValue,
};
pub use codegen::CodegenError;
pub use compiler::{AsnCompiler, Features, SourceId};
pub use diagnostic::{Diagnostic, Label, Span};
pub use lexer::LexerError;
pub use parser::ParserError;
