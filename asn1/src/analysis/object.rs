use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{ObjectDefn, ObjectDefnNode, Setting, Spanned, Type, Value},
    diagnostic::Span,
};

use super::{
    class::{CompiledField, CompiledObjectClass, FieldId, FieldKind, FieldValue},
    context::AnalysisContext,
    error::AnalysisError,
    matcher::Matcher,
    table::Symbol,
    ty::CompiledType,
    Result,
};

/// An information object, with a value bound to every field that was set or
/// has a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledObject {
    /// Not present for objects defined in place
    name: Option<String>,
    class: Rc<CompiledObjectClass>,

    /// Bound fields, in the declaration order of the class
    values: Vec<(FieldId, FieldValue)>,
}

impl CompiledObject {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn class(&self) -> &Rc<CompiledObjectClass> {
        &self.class
    }

    /// The value bound to a field, without the leading `&`
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let (id, _) = self.class.field(name)?;
        self.values
            .iter()
            .find(|(field, _)| *field == id)
            .map(|(_, value)| value)
    }

    /// Every bound field along with its value
    pub fn fields(&self) -> impl Iterator<Item = (&CompiledField, &FieldValue)> + '_ {
        self.values
            .iter()
            .filter_map(|(id, value)| Some((self.class.field_by_id(*id)?, value)))
    }
}

impl<'a> AnalysisContext<'a> {
    /// Compile an object definition of the given class
    pub(super) fn compile_object(
        &mut self,
        name: Option<&str>,
        class: &Rc<CompiledObjectClass>,
        node: &ObjectDefnNode,
    ) -> Result<CompiledObject> {
        let settings = match &node.defn {
            ObjectDefn::Default(settings) => {
                let mut bound: Vec<(FieldId, Spanned<Setting>)> = vec![];
                for setting in settings {
                    let Some((id, _)) = class.field(&setting.field.value) else {
                        return Err(AnalysisError::UndefinedField {
                            field: setting.field.value.clone(),
                            class: class.name().to_string(),
                            span: setting.field.span,
                        });
                    };
                    if bound.iter().any(|(field, _)| *field == id) {
                        return Err(AnalysisError::DuplicateFieldSetting {
                            field: setting.field.value.clone(),
                            span: setting.field.span,
                        });
                    }
                    bound.push((id, setting.setting.clone()));
                }
                bound
            }
            ObjectDefn::Defined(tokens) => {
                let Some(grammar) = class.syntax() else {
                    return Err(AnalysisError::NoDefinedSyntax {
                        class: class.name().to_string(),
                        span: node.span,
                    });
                };
                Matcher::new(class, grammar, tokens, node.span).run(grammar)?
            }
        };

        let mut values: Vec<Option<FieldValue>> = vec![None; class.fields().len()];

        // fields that do not depend on another field of the object
        for (id, setting) in &settings {
            let field = field_of(class, *id, setting.span)?;
            if field.governor().is_none() {
                values[id.0] = Some(self.compile_setting(field, None, setting)?);
            }
        }

        for (id, setting) in &settings {
            let field = field_of(class, *id, setting.span)?;
            let Some(governor) = field.governor() else {
                continue;
            };

            let Some(ty) = governing_type(class, &values, governor) else {
                return Err(AnalysisError::UnboundGoverningField {
                    field: field.name.clone(),
                    governor: field_of(class, governor, setting.span)?.name.clone(),
                    span: setting.span,
                });
            };
            values[id.0] = Some(self.compile_setting(field, Some(&ty), setting)?);
        }

        for (id, field) in class.enumerate() {
            if values[id.0].is_some() {
                continue;
            }

            if let Some(default) = field.default() {
                if let Some(governor) = field.governor() {
                    check_default_type(class, &values, field, governor, default, node)?;
                }
                values[id.0] = Some(default.clone());
            } else if field.is_mandatory() {
                return Err(AnalysisError::MandatoryField {
                    field: field.name.clone(),
                    class: class.name().to_string(),
                    span: node.span,
                });
            }
        }

        let values: Vec<_> = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| Some((FieldId(i), value?)))
            .collect();

        debug!(
            object = name.unwrap_or("<anonymous>"),
            class = class.name(),
            fields = values.len(),
            "compiled object"
        );

        Ok(CompiledObject {
            name: name.map(str::to_string),
            class: Rc::clone(class),
            values,
        })
    }

    /// Compile the setting of a single field.  Variable type fields are
    /// checked against the type bound to their governing field.
    fn compile_setting(
        &mut self,
        field: &CompiledField,
        governing: Option<&Rc<CompiledType>>,
        setting: &Spanned<Setting>,
    ) -> Result<FieldValue> {
        let label = format!("&{}", field.name);

        let value = match (field.kind(), governing) {
            (FieldKind::Type, _) => FieldValue::Type(self.resolve_setting_type(&label, setting)?),
            (FieldKind::FixedTypeValue { ty, .. }, _) => {
                FieldValue::Value(self.resolve_typed_value(&label, ty, setting)?)
            }
            (FieldKind::FixedTypeValueSet { ty }, _) => {
                FieldValue::ValueSet(self.resolve_value_set(&label, ty, setting)?)
            }
            (FieldKind::VariableTypeValue { .. }, Some(ty)) => {
                FieldValue::Value(self.resolve_typed_value(&label, ty, setting)?)
            }
            (FieldKind::VariableTypeValueSet { .. }, Some(ty)) => {
                FieldValue::ValueSet(self.resolve_value_set(&label, ty, setting)?)
            }
            (FieldKind::Object { class }, _) => {
                let class = self.class_by_ref(class, setting.span)?;
                FieldValue::Object(self.resolve_object(&class, setting, None)?)
            }
            (FieldKind::ObjectSet { class }, _) => {
                let class = self.class_by_ref(class, setting.span)?;
                FieldValue::ObjectSet(self.resolve_object_set(&class, setting, None)?)
            }
            (FieldKind::VariableTypeValue { .. } | FieldKind::VariableTypeValueSet { .. }, None) => {
                return Err(AnalysisError::Internal {
                    message: "variable type field compiled without its type",
                    span: setting.span,
                })
            }
        };

        Ok(value)
    }

    /// Resolve an object setting: a reference to an object, or an object
    /// defined in place
    pub(super) fn resolve_object(
        &mut self,
        class: &Rc<CompiledObjectClass>,
        setting: &Spanned<Setting>,
        name: Option<&str>,
    ) -> Result<Rc<CompiledObject>> {
        let reference = match &setting.value {
            Setting::Value(Value::Braced(braced)) => {
                let node = self.parse_braced(braced, |p| p.object_defn(braced))?;
                return Ok(Rc::new(self.compile_object(name, class, &node)?));
            }
            Setting::Value(Value::Reference(reference)) => reference,
            Setting::Type(Type::Reference(reference)) => reference,
            other => {
                return Err(AnalysisError::SettingKindMismatch {
                    field: name.unwrap_or("object").to_string(),
                    expected: format!("an object of class `{}`", class.name()),
                    found: other.describe(),
                    span: setting.span,
                })
            }
        };

        match self.symbol(reference)? {
            Symbol::Object(object) => {
                same_class(class, object.class(), setting.span)?;
                Ok(object)
            }
            other => Err(AnalysisError::WrongKind {
                name: reference.name.value.clone(),
                expected: "an object",
                found: other.describe(),
                span: setting.span,
            }),
        }
    }
}

/// Objects can only be used where their exact class is expected
pub(super) fn same_class(
    expected: &CompiledObjectClass,
    found: &CompiledObjectClass,
    span: Span,
) -> Result {
    if expected.class_ref() != found.class_ref() {
        return Err(AnalysisError::ClassMismatch {
            expected: expected.name().to_string(),
            found: found.name().to_string(),
            span,
        });
    }
    Ok(())
}

fn field_of(class: &CompiledObjectClass, id: FieldId, span: Span) -> Result<&CompiledField> {
    class.field_by_id(id).ok_or(AnalysisError::Internal {
        message: "field id out of range",
        span,
    })
}

/// The type bound to a type field of an object, or its default
fn governing_type(
    class: &CompiledObjectClass,
    values: &[Option<FieldValue>],
    governor: FieldId,
) -> Option<Rc<CompiledType>> {
    match values.get(governor.0)? {
        Some(FieldValue::Type(ty)) => Some(Rc::clone(ty)),
        Some(_) => None,
        None => match class.field_by_id(governor)?.default()? {
            FieldValue::Type(ty) => Some(Rc::clone(ty)),
            _ => None,
        },
    }
}

/// The default of a variable type field was checked against the default of
/// its governing field, which this object may have replaced
fn check_default_type(
    class: &CompiledObjectClass,
    values: &[Option<FieldValue>],
    field: &CompiledField,
    governor: FieldId,
    default: &FieldValue,
    node: &ObjectDefnNode,
) -> Result {
    let Some(actual) = governing_type(class, values, governor) else {
        return Ok(());
    };

    let default_ty = match default {
        FieldValue::Value(value) => &value.ty,
        FieldValue::ValueSet(set) => &set.ty,
        _ => return Ok(()),
    };

    if actual.compatible(default_ty) {
        return Ok(());
    }

    Err(AnalysisError::TypeMismatch {
        expected: actual.to_string(),
        found: format!("the default of `&{}` of type {default_ty}", field.name),
        span: node.span,
    })
}
