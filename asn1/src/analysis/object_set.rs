use std::{fmt::Display, rc::Rc};

use tracing::debug;

use crate::ast::{Braced, ObjectSetElement, Setting, Spanned, Type, Value};

use super::{
    class::CompiledObjectClass,
    context::AnalysisContext,
    error::AnalysisError,
    object::{same_class, CompiledObject},
    table::Symbol,
    Result,
};

/// A set of objects of one class.  Object sets referenced from within the
/// set are flattened into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledObjectSet {
    pub name: Option<String>,
    pub class: Rc<CompiledObjectClass>,
    pub objects: Vec<Rc<CompiledObject>>,
    pub extensible: bool,
}

impl<'a> AnalysisContext<'a> {
    /// Compile the contents of the braces of an object set
    pub(super) fn compile_object_set(
        &mut self,
        name: Option<&str>,
        class: &Rc<CompiledObjectClass>,
        braced: &Braced,
    ) -> Result<CompiledObjectSet> {
        let spec = self.parse_braced(braced, |p| p.object_set_spec())?;

        let mut objects = vec![];
        for element in &spec.elements {
            match element {
                ObjectSetElement::Reference(reference) => {
                    let span = reference.name.span;
                    match self.symbol(reference)? {
                        Symbol::Object(object) => {
                            same_class(class, object.class(), span)?;
                            objects.push(object);
                        }
                        Symbol::ObjectSet(set) => {
                            same_class(class, &set.class, span)?;
                            objects.extend(set.objects.iter().cloned());
                        }
                        other => {
                            return Err(AnalysisError::WrongKind {
                                name: reference.name.value.clone(),
                                expected: "an object or an object set",
                                found: other.describe(),
                                span,
                            })
                        }
                    }
                }
                ObjectSetElement::Defn(node) => {
                    objects.push(Rc::new(self.compile_object(None, class, node)?));
                }
            }
        }

        debug!(
            set = name.unwrap_or("<anonymous>"),
            class = class.name(),
            objects = objects.len(),
            extensible = spec.extensible,
            "compiled object set"
        );

        Ok(CompiledObjectSet {
            name: name.map(str::to_string),
            class: Rc::clone(class),
            objects,
            extensible: spec.extensible,
        })
    }

    /// Resolve an object set setting: a reference to an object set, or the
    /// contents of an object set in braces
    pub(super) fn resolve_object_set(
        &mut self,
        class: &Rc<CompiledObjectClass>,
        setting: &Spanned<Setting>,
        name: Option<&str>,
    ) -> Result<Rc<CompiledObjectSet>> {
        match &setting.value {
            Setting::Value(Value::Braced(braced)) => {
                Ok(Rc::new(self.compile_object_set(name, class, braced)?))
            }
            Setting::Type(Type::Reference(reference)) => match self.symbol(reference)? {
                Symbol::ObjectSet(set) => {
                    same_class(class, &set.class, setting.span)?;
                    Ok(set)
                }
                other => Err(AnalysisError::WrongKind {
                    name: reference.name.value.clone(),
                    expected: "an object set",
                    found: other.describe(),
                    span: setting.span,
                }),
            },
            other => Err(AnalysisError::SettingKindMismatch {
                field: name.unwrap_or("object set").to_string(),
                expected: format!("an object set of class `{}`", class.name()),
                found: other.describe(),
                span: setting.span,
            }),
        }
    }
}

impl Display for CompiledObjectSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.name {
            return write!(f, "{name}");
        }

        write!(f, "{{")?;
        for (i, object) in self.objects.iter().enumerate() {
            let sep = if i == 0 { " " } else { " | " };
            match object.name() {
                Some(name) => write!(f, "{sep}{name}")?,
                None => write!(f, "{sep}{{ ... }}")?,
            }
        }
        if self.extensible {
            let sep = if self.objects.is_empty() { " " } else { ", " };
            write!(f, "{sep}...")?;
        }
        write!(f, " }}")
    }
}
