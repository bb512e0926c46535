use std::{collections::HashMap, fmt::Display, rc::Rc};

use tracing::debug;

use crate::{
    ast::{FieldSpecKind, ObjectClassDefn, Spanned},
    diagnostic::Span,
};

use super::{
    context::AnalysisContext,
    error::AnalysisError,
    object::CompiledObject,
    object_set::CompiledObjectSet,
    syntax::SyntaxGrammar,
    ty::CompiledType,
    value::{CompiledValueSet, TypedValue},
    Result,
};

/// Identity of an object class: the module it is defined in and its name.
/// Aliases of a class share the identity of the class they name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    pub module: String,
    pub name: String,
}

/// Index of a field within its class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub(super) usize);

/// An information object class, with all field types resolved and its
/// `WITH SYNTAX` grammar validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledObjectClass {
    class: ClassRef,

    /// Every field, in declaration order
    fields: Vec<CompiledField>,

    /// Absent if objects can only use the default syntax
    syntax: Option<SyntaxGrammar>,

    /// Field name to position in `fields`
    index: HashMap<String, FieldId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledField {
    pub name: String,
    pub span: Span,
    pub kind: FieldKind,
    pub optionality: FieldOptionality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `&Type`
    Type,

    /// `&value INTEGER`
    FixedTypeValue { ty: Rc<CompiledType>, unique: bool },

    /// `&Values INTEGER`
    FixedTypeValueSet { ty: Rc<CompiledType> },

    /// `&value &Type`, the type comes from a type field of the same object
    VariableTypeValue { governor: FieldId },

    /// `&Values &Type`
    VariableTypeValueSet { governor: FieldId },

    /// `&obj OTHER-CLASS`
    Object { class: ClassRef },

    /// `&Objs OTHER-CLASS`
    ObjectSet { class: ClassRef },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOptionality {
    Mandatory,
    Optional,
    Default(FieldValue),
}

/// Anything that can be bound to a field of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Type(Rc<CompiledType>),
    Value(Rc<TypedValue>),
    ValueSet(Rc<CompiledValueSet>),
    Object(Rc<CompiledObject>),
    ObjectSet(Rc<CompiledObjectSet>),
}

impl CompiledObjectClass {
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Name of the module the class was defined in
    pub fn module(&self) -> &str {
        &self.class.module
    }

    pub fn class_ref(&self) -> &ClassRef {
        &self.class
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Find a field by name, without the leading `&`
    pub fn field(&self, name: &str) -> Option<(FieldId, &CompiledField)> {
        let id = *self.index.get(name)?;
        Some((id, self.field_by_id(id)?))
    }

    pub fn field_by_id(&self, id: FieldId) -> Option<&CompiledField> {
        self.fields.get(id.0)
    }

    pub fn syntax(&self) -> Option<&SyntaxGrammar> {
        self.syntax.as_ref()
    }

    /// Iterate over the fields along with their ids
    pub(super) fn enumerate(&self) -> impl Iterator<Item = (FieldId, &CompiledField)> + '_ {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }
}

impl CompiledField {
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Must every object set this field
    pub fn is_mandatory(&self) -> bool {
        matches!(self.optionality, FieldOptionality::Mandatory)
    }

    pub fn default(&self) -> Option<&FieldValue> {
        match &self.optionality {
            FieldOptionality::Default(value) => Some(value),
            _ => None,
        }
    }

    /// Is this a variable type value or value set field, returning the field
    /// whose type it uses
    pub fn governor(&self) -> Option<FieldId> {
        match self.kind {
            FieldKind::VariableTypeValue { governor }
            | FieldKind::VariableTypeValueSet { governor } => Some(governor),
            _ => None,
        }
    }
}

impl FieldKind {
    /// Name of the kind of field, as used in X.681
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Type => "type field",
            FieldKind::FixedTypeValue { .. } => "fixed type value field",
            FieldKind::FixedTypeValueSet { .. } => "fixed type value set field",
            FieldKind::VariableTypeValue { .. } => "variable type value field",
            FieldKind::VariableTypeValueSet { .. } => "variable type value set field",
            FieldKind::Object { .. } => "object field",
            FieldKind::ObjectSet { .. } => "object set field",
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Type(ty) => write!(f, "{ty}"),
            FieldValue::Value(value) => write!(f, "{}", value.value),
            FieldValue::ValueSet(set) => {
                write!(f, "{{")?;
                for (i, value) in set.values.iter().enumerate() {
                    let sep = if i == 0 { " " } else { " | " };
                    write!(f, "{sep}{value}")?;
                }
                if set.extensible {
                    write!(f, ", ...")?;
                }
                write!(f, " }}")
            }
            FieldValue::Object(object) => match object.name() {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "{{ object of class {} }}", object.class().name()),
            },
            FieldValue::ObjectSet(set) => write!(f, "{set}"),
        }
    }
}

/// An object class that is still being compiled.  Only converted into a
/// [`CompiledObjectClass`] once every field has compiled, so a failed class is
/// never registered.
#[derive(Debug)]
pub(super) struct ObjectClassBuilder {
    pub(super) class: ClassRef,

    /// Compiled fields, in declaration order
    pub(super) fields: Vec<Option<CompiledField>>,

    /// Every declared field name, known before any field is compiled
    pub(super) index: HashMap<String, FieldId>,
}

impl ObjectClassBuilder {
    fn new(class: ClassRef, defn: &ObjectClassDefn) -> Result<Self> {
        let mut index = HashMap::new();

        for (i, field) in defn.fields.iter().enumerate() {
            if index
                .insert(field.name.value.clone(), FieldId(i))
                .is_some()
            {
                return Err(AnalysisError::DuplicateField {
                    field: field.name.value.clone(),
                    span: field.name.span,
                });
            }
        }

        Ok(ObjectClassBuilder {
            class,
            fields: vec![None; defn.fields.len()],
            index,
        })
    }

    /// Get an already compiled field
    pub(super) fn compiled(&self, id: FieldId) -> Option<&CompiledField> {
        self.fields.get(id.0)?.as_ref()
    }

    fn finish(self, span: Span) -> Result<CompiledObjectClass> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let Some(field) = field else {
                return Err(AnalysisError::Internal {
                    message: "object class field was not compiled",
                    span,
                });
            };
            fields.push(field);
        }

        Ok(CompiledObjectClass {
            class: self.class,
            fields,
            syntax: None,
            index: self.index,
        })
    }
}

impl<'a> AnalysisContext<'a> {
    /// Compile an object class definition.  Fields whose type depends on
    /// another field of the class are compiled after every other field, so
    /// governing fields can be declared in any order.
    pub(super) fn compile_class(
        &mut self,
        name: &Spanned<String>,
        defn: &ObjectClassDefn,
    ) -> Result<CompiledObjectClass> {
        let class = ClassRef {
            module: self.current_module().to_string(),
            name: name.value.clone(),
        };
        let mut builder = ObjectClassBuilder::new(class, defn)?;

        let (variable, fixed): (Vec<_>, Vec<_>) =
            defn.fields.iter().enumerate().partition(|(_, f)| {
                matches!(
                    f.kind,
                    FieldSpecKind::VariableTypeValue { .. }
                        | FieldSpecKind::VariableTypeValueSet { .. }
                )
            });

        for (i, field) in fixed.into_iter().chain(variable) {
            let compiled = self.compile_field(&builder, field)?;
            builder.fields[i] = Some(compiled);
        }

        let mut compiled = builder.finish(defn.span)?;
        if let Some(syntax) = &defn.syntax {
            compiled.syntax = Some(SyntaxGrammar::new(syntax, &compiled)?);
        }

        debug!(
            class = %name.value,
            fields = compiled.fields.len(),
            syntax = compiled.syntax.is_some(),
            "compiled object class"
        );

        Ok(compiled)
    }

    /// Get the compiled class with the given identity
    pub(super) fn class_by_ref(
        &mut self,
        class: &ClassRef,
        span: Span,
    ) -> Result<Rc<CompiledObjectClass>> {
        let reference = crate::ast::Reference {
            module: Some(Spanned::new(class.module.clone(), span)),
            name: Spanned::new(class.name.clone(), span),
            actual_parameters: None,
        };

        match self.symbol(&reference)? {
            super::table::Symbol::Class(compiled) => Ok(compiled),
            _ => Err(AnalysisError::UndefinedClass {
                name: class.name.clone(),
                span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_names() {
        assert_eq!(FieldKind::Type.name(), "type field");
        assert_eq!(
            FieldKind::VariableTypeValueSet {
                governor: FieldId(0)
            }
            .name(),
            "variable type value set field"
        );
    }
}
