use std::rc::Rc;

use crate::ast::{self, FieldSpecKind, FieldSpecNode, Optionality, Setting, Spanned};

use super::{
    class::{ClassRef, CompiledField, FieldId, FieldKind, FieldOptionality, FieldValue, ObjectClassBuilder},
    context::AnalysisContext,
    error::AnalysisError,
    table::Symbol,
    ty::CompiledType,
    Result,
};

impl<'a> AnalysisContext<'a> {
    /// Compile a single field spec of a class.  Every field that is not a
    /// variable type field has already been compiled when a variable type
    /// field is compiled.
    pub(super) fn compile_field(
        &mut self,
        builder: &ObjectClassBuilder,
        field: &FieldSpecNode,
    ) -> Result<CompiledField> {
        let name = &field.name;

        let (kind, optionality) = match &field.kind {
            FieldSpecKind::Type { optionality } => {
                let optionality = match optionality {
                    Optionality::Mandatory => FieldOptionality::Mandatory,
                    Optionality::Optional => FieldOptionality::Optional,
                    Optionality::Default(ty) => {
                        FieldOptionality::Default(FieldValue::Type(self.resolve_type(ty)?))
                    }
                };
                (FieldKind::Type, optionality)
            }
            FieldSpecKind::FixedTypeValueOrObject {
                governor,
                unique,
                optionality,
            } => match self.probe_class(governor)? {
                Some(class) => {
                    if let Some(span) = unique {
                        return Err(AnalysisError::Unsupported {
                            feature: "unique object fields",
                            span: *span,
                        });
                    }
                    self.check_self_reference(builder, name, &class, optionality)?;

                    let optionality = match optionality {
                        Optionality::Mandatory => FieldOptionality::Mandatory,
                        Optionality::Optional => FieldOptionality::Optional,
                        Optionality::Default(value) => {
                            let compiled = self.class_by_ref(&class, governor.span)?;
                            let setting = value.clone().map(Setting::Value);
                            let object = self.resolve_object(&compiled, &setting, None)?;
                            FieldOptionality::Default(FieldValue::Object(object))
                        }
                    };
                    (FieldKind::Object { class }, optionality)
                }
                None => {
                    let ty = self.resolve_type(governor)?;
                    let optionality = match optionality {
                        Optionality::Mandatory => FieldOptionality::Mandatory,
                        Optionality::Optional => FieldOptionality::Optional,
                        Optionality::Default(_) if unique.is_some() => {
                            return Err(AnalysisError::UniqueWithDefault {
                                field: name.value.clone(),
                                span: name.span,
                            })
                        }
                        Optionality::Default(value) => {
                            let setting = value.clone().map(Setting::Value);
                            let value = self.resolve_typed_value(
                                &format!("&{}", name.value),
                                &ty,
                                &setting,
                            )?;
                            FieldOptionality::Default(FieldValue::Value(value))
                        }
                    };
                    let kind = FieldKind::FixedTypeValue {
                        ty,
                        unique: unique.is_some(),
                    };
                    (kind, optionality)
                }
            },
            FieldSpecKind::FixedTypeValueSetOrObjectSet {
                governor,
                optionality,
            } => match self.probe_class(governor)? {
                Some(class) => {
                    self.check_self_reference(builder, name, &class, optionality)?;

                    let optionality = match optionality {
                        Optionality::Mandatory => FieldOptionality::Mandatory,
                        Optionality::Optional => FieldOptionality::Optional,
                        Optionality::Default(setting) => {
                            let compiled = self.class_by_ref(&class, governor.span)?;
                            let set = self.resolve_object_set(&compiled, setting, None)?;
                            FieldOptionality::Default(FieldValue::ObjectSet(set))
                        }
                    };
                    (FieldKind::ObjectSet { class }, optionality)
                }
                None => {
                    let ty = self.resolve_type(governor)?;
                    let optionality = match optionality {
                        Optionality::Mandatory => FieldOptionality::Mandatory,
                        Optionality::Optional => FieldOptionality::Optional,
                        Optionality::Default(setting) => {
                            let set = self.resolve_value_set(
                                &format!("&{}", name.value),
                                &ty,
                                setting,
                            )?;
                            FieldOptionality::Default(FieldValue::ValueSet(set))
                        }
                    };
                    (FieldKind::FixedTypeValueSet { ty }, optionality)
                }
            },
            FieldSpecKind::VariableTypeValue {
                field_name,
                optionality,
            } => {
                let has_default = matches!(optionality, Optionality::Default(_));
                let (governor, default_ty) =
                    governing_field(builder, name, field_name, has_default)?;

                let optionality = match (optionality, default_ty) {
                    (Optionality::Mandatory, _) => FieldOptionality::Mandatory,
                    (Optionality::Optional, _) => FieldOptionality::Optional,
                    (Optionality::Default(value), Some(ty)) => {
                        let setting = value.clone().map(Setting::Value);
                        let value =
                            self.resolve_typed_value(&format!("&{}", name.value), &ty, &setting)?;
                        FieldOptionality::Default(FieldValue::Value(value))
                    }
                    (Optionality::Default(value), None) => {
                        return Err(AnalysisError::Internal {
                            message: "governing field default was not checked",
                            span: value.span,
                        })
                    }
                };
                (FieldKind::VariableTypeValue { governor }, optionality)
            }
            FieldSpecKind::VariableTypeValueSet {
                field_name,
                optionality,
            } => {
                let has_default = matches!(optionality, Optionality::Default(_));
                let (governor, default_ty) =
                    governing_field(builder, name, field_name, has_default)?;

                let optionality = match (optionality, default_ty) {
                    (Optionality::Mandatory, _) => FieldOptionality::Mandatory,
                    (Optionality::Optional, _) => FieldOptionality::Optional,
                    (Optionality::Default(setting), Some(ty)) => {
                        let set =
                            self.resolve_value_set(&format!("&{}", name.value), &ty, setting)?;
                        FieldOptionality::Default(FieldValue::ValueSet(set))
                    }
                    (Optionality::Default(setting), None) => {
                        return Err(AnalysisError::Internal {
                            message: "governing field default was not checked",
                            span: setting.span,
                        })
                    }
                };
                (FieldKind::VariableTypeValueSet { governor }, optionality)
            }
        };

        Ok(CompiledField {
            name: name.value.clone(),
            span: field.span,
            kind,
            optionality,
        })
    }

    /// Does the governor of a field name an object class.  Decides between an
    /// object (set) field and a fixed type value (set) field, which are
    /// written the same way.  Classes that are still being compiled count, so
    /// a class can contain objects of itself.
    pub(super) fn probe_class(&mut self, governor: &Spanned<ast::Type>) -> Result<Option<ClassRef>> {
        let ast::Type::Reference(reference) = &governor.value else {
            return Ok(None);
        };
        if reference.actual_parameters.is_some() {
            return Ok(None);
        }

        if reference.module.is_none() {
            if let Some(symbol) = self.lookup_dummy(&reference.name.value) {
                return Ok(match symbol {
                    Symbol::Class(class) => Some(class.class_ref().clone()),
                    _ => None,
                });
            }
        }

        let (module, assignment) = self.locate(reference)?;
        match &assignment.kind {
            ast::AssignmentKind::ObjectClass(_) => Ok(Some(ClassRef {
                module: self.module_name(module).to_string(),
                name: assignment.name.value.clone(),
            })),
            ast::AssignmentKind::Type(ty)
                if matches!(ty.value, ast::Type::Reference(_)) && !assignment.is_parameterized() =>
            {
                match self.symbol(reference)? {
                    Symbol::Class(class) => Ok(Some(class.class_ref().clone())),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// Object and object set fields of the class being defined could nest
    /// forever unless they can be left out
    fn check_self_reference<T>(
        &self,
        builder: &ObjectClassBuilder,
        name: &Spanned<String>,
        class: &ClassRef,
        optionality: &Optionality<T>,
    ) -> Result {
        if *class == builder.class && !matches!(optionality, Optionality::Optional) {
            return Err(AnalysisError::SelfReferenceNotOptional {
                field: name.value.clone(),
                class: class.name.clone(),
                span: name.span,
            });
        }
        Ok(())
    }
}

/// Find the type field governing a variable type value (set) field.  If the
/// field has a default, the default type of the governing field is returned to
/// check it against.
fn governing_field(
    builder: &ObjectClassBuilder,
    name: &Spanned<String>,
    chain: &[Spanned<String>],
    has_default: bool,
) -> Result<(FieldId, Option<Rc<CompiledType>>)> {
    let governor = match chain {
        [governor] => governor,
        [_, nested, ..] => {
            return Err(AnalysisError::NestedFieldReferenceUnsupported {
                field: name.value.clone(),
                span: nested.span,
            })
        }
        [] => {
            return Err(AnalysisError::Internal {
                message: "empty field name",
                span: name.span,
            })
        }
    };

    let undefined = || AnalysisError::UndefinedGoverningField {
        field: name.value.clone(),
        governor: governor.value.clone(),
        span: governor.span,
    };

    let id = *builder.index.get(&governor.value).ok_or_else(undefined)?;

    // variable type fields are compiled last, so any other kind of field has
    // been compiled already
    let compiled = match builder.compiled(id) {
        Some(compiled) if compiled.kind == FieldKind::Type => compiled,
        _ => {
            return Err(AnalysisError::GoverningFieldNotTypeField {
                field: name.value.clone(),
                governor: governor.value.clone(),
                span: governor.span,
            })
        }
    };

    if !has_default {
        return Ok((id, None));
    }

    match &compiled.optionality {
        FieldOptionality::Default(FieldValue::Type(ty)) => Ok((id, Some(Rc::clone(ty)))),
        _ => Err(AnalysisError::GoverningFieldWithoutDefault {
            field: name.value.clone(),
            governor: governor.value.clone(),
            span: governor.span,
        }),
    }
}
