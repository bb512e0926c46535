use std::{fmt::Display, rc::Rc};

use crate::ast::{self, Setting, Spanned, StringKind, Type};

use super::{
    class::FieldKind, context::AnalysisContext, error::AnalysisError, table::Symbol,
    value::TypedValue, Result,
};

/// A type with all references resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledType {
    Boolean,
    Null,

    /// Named numbers, in declaration order
    Integer(Vec<(String, i64)>),
    Real,
    Enumerated {
        items: Vec<(String, i64)>,
        extensible: bool,
    },

    /// Named bits, in declaration order
    BitString(Vec<(String, i64)>),
    OctetString,
    ObjectIdentifier,
    RelativeOid,
    CharacterString(StringKind),
    Sequence(Vec<CompiledComponent>),
    Set(Vec<CompiledComponent>),
    SequenceOf(Rc<CompiledType>),
    SetOf(Rc<CompiledType>),
    Choice(Vec<CompiledComponent>),

    /// The type of a type field, can hold a value of any type
    Open,

    /// A named type from a type assignment
    Reference { name: String, ty: Rc<CompiledType> },
}

/// A component of a SEQUENCE, SET or CHOICE type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledComponent {
    pub name: String,
    pub ty: Rc<CompiledType>,
    pub optional: bool,
    pub default: Option<Rc<TypedValue>>,
}

impl CompiledType {
    /// The underlying type, with any names removed
    pub fn base(&self) -> &CompiledType {
        match self {
            CompiledType::Reference { ty, .. } => ty.base(),
            ty => ty,
        }
    }

    /// Can a value of type `other` be used where a value of this type is
    /// expected.  Constraints are not checked.
    pub fn compatible(&self, other: &CompiledType) -> bool {
        let (this, other) = (self.base(), other.base());

        match (this, other) {
            (CompiledType::Open, _) | (_, CompiledType::Open) => true,
            (CompiledType::SequenceOf(a), CompiledType::SequenceOf(b))
            | (CompiledType::SetOf(a), CompiledType::SetOf(b)) => a.compatible(b),
            (CompiledType::Sequence(a), CompiledType::Sequence(b))
            | (CompiledType::Set(a), CompiledType::Set(b))
            | (CompiledType::Choice(a), CompiledType::Choice(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|(a, b)| a.name == b.name && a.ty.compatible(&b.ty))
            }
            (CompiledType::CharacterString(a), CompiledType::CharacterString(b)) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl Display for CompiledType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompiledType::Boolean => write!(f, "BOOLEAN"),
            CompiledType::Null => write!(f, "NULL"),
            CompiledType::Integer(_) => write!(f, "INTEGER"),
            CompiledType::Real => write!(f, "REAL"),
            CompiledType::Enumerated { .. } => write!(f, "ENUMERATED"),
            CompiledType::BitString(_) => write!(f, "BIT STRING"),
            CompiledType::OctetString => write!(f, "OCTET STRING"),
            CompiledType::ObjectIdentifier => write!(f, "OBJECT IDENTIFIER"),
            CompiledType::RelativeOid => write!(f, "RELATIVE-OID"),
            CompiledType::CharacterString(kind) => write!(f, "{}", kind.name()),
            CompiledType::Sequence(_) => write!(f, "SEQUENCE"),
            CompiledType::Set(_) => write!(f, "SET"),
            CompiledType::SequenceOf(ty) => write!(f, "SEQUENCE OF {ty}"),
            CompiledType::SetOf(ty) => write!(f, "SET OF {ty}"),
            CompiledType::Choice(_) => write!(f, "CHOICE"),
            CompiledType::Open => write!(f, "open type"),
            CompiledType::Reference { name, .. } => write!(f, "{name}"),
        }
    }
}

impl<'a> AnalysisContext<'a> {
    /// Resolve a type written in the source.  Tags and constraints do not
    /// change which values are accepted, so are not kept.
    pub(super) fn resolve_type(&mut self, ty: &Spanned<Type>) -> Result<Rc<CompiledType>> {
        let compiled = match &ty.value {
            Type::Boolean => CompiledType::Boolean,
            Type::Null => CompiledType::Null,
            Type::Integer(numbers) => CompiledType::Integer(named_numbers(numbers)),
            Type::Real => CompiledType::Real,
            Type::Enumerated { items, extensible } => CompiledType::Enumerated {
                items: enumeration_items(items),
                extensible: *extensible,
            },
            Type::BitString(numbers) => CompiledType::BitString(named_numbers(numbers)),
            Type::OctetString => CompiledType::OctetString,
            Type::ObjectIdentifier => CompiledType::ObjectIdentifier,
            Type::RelativeOid => CompiledType::RelativeOid,
            Type::CharacterString(kind) => CompiledType::CharacterString(*kind),
            Type::Sequence { components, .. } => {
                CompiledType::Sequence(self.components(components)?)
            }
            Type::Set { components, .. } => CompiledType::Set(self.components(components)?),
            Type::Choice { alternatives, .. } => {
                CompiledType::Choice(self.components(alternatives)?)
            }
            Type::SequenceOf(element) => CompiledType::SequenceOf(self.resolve_type(element)?),
            Type::SetOf(element) => CompiledType::SetOf(self.resolve_type(element)?),
            Type::Tagged { ty, .. } | Type::Constrained { ty, .. } => {
                return self.resolve_type(ty)
            }
            Type::Reference(reference) => {
                return match self.symbol(reference)? {
                    Symbol::Type(resolved) => Ok(Rc::new(CompiledType::Reference {
                        name: reference.name.value.clone(),
                        ty: resolved,
                    })),
                    other => Err(AnalysisError::WrongKind {
                        name: reference.name.value.clone(),
                        expected: "a type",
                        found: other.describe(),
                        span: ty.span,
                    }),
                }
            }
            Type::ClassField { class, field } => return self.class_field_type(class, field),
        };

        Ok(Rc::new(compiled))
    }

    /// Resolve a setting that must be a type, `NULL` is read as a type here
    pub(super) fn resolve_setting_type(
        &mut self,
        field: &str,
        setting: &Spanned<Setting>,
    ) -> Result<Rc<CompiledType>> {
        match &setting.value {
            Setting::Type(ty) => self.resolve_type(&Spanned::new(ty.clone(), setting.span)),
            Setting::Value(ast::Value::Null) => Ok(Rc::new(CompiledType::Null)),
            Setting::Value(value) => Err(AnalysisError::SettingKindMismatch {
                field: field.to_string(),
                expected: "a type".to_string(),
                found: value.describe(),
                span: setting.span,
            }),
        }
    }

    /// The type of a field of an object class, e.g. `MY-CLASS.&id`
    fn class_field_type(
        &mut self,
        class: &ast::Reference,
        field: &[Spanned<String>],
    ) -> Result<Rc<CompiledType>> {
        let class_span = class.name.span;
        let class = match self.symbol(class)? {
            Symbol::Class(class) => class,
            _ => {
                return Err(AnalysisError::UndefinedClass {
                    name: class.name.value.clone(),
                    span: class_span,
                })
            }
        };

        let [name] = field else {
            let span = field
                .first()
                .map(|f| f.span)
                .unwrap_or(class_span);
            return Err(AnalysisError::Unsupported {
                feature: "object class field types through object fields",
                span,
            });
        };

        let Some((_, compiled)) = class.field(&name.value) else {
            return Err(AnalysisError::UndefinedField {
                field: name.value.clone(),
                class: class.name().to_string(),
                span: name.span,
            });
        };

        match compiled.kind() {
            FieldKind::FixedTypeValue { ty, .. } => Ok(Rc::clone(ty)),
            FieldKind::FixedTypeValueSet { ty } => Ok(Rc::clone(ty)),
            FieldKind::Type
            | FieldKind::VariableTypeValue { .. }
            | FieldKind::VariableTypeValueSet { .. } => Ok(Rc::new(CompiledType::Open)),
            FieldKind::Object { .. } | FieldKind::ObjectSet { .. } => {
                Err(AnalysisError::WrongKind {
                    name: format!("{}.&{}", class.name(), name.value),
                    expected: "a type",
                    found: "an object field",
                    span: name.span,
                })
            }
        }
    }

    /// Resolve the components of a SEQUENCE, SET or CHOICE
    fn components(&mut self, components: &[ast::Component]) -> Result<Vec<CompiledComponent>> {
        let mut compiled = Vec::with_capacity(components.len());

        for component in components {
            let ty = self.resolve_type(&component.ty)?;
            let (optional, default) = match &component.optionality {
                ast::ComponentOptionality::Mandatory => (false, None),
                ast::ComponentOptionality::Optional => (true, None),
                ast::ComponentOptionality::Default(value) => {
                    let value = self.resolve_value(&ty, value)?;
                    let default = TypedValue {
                        ty: Rc::clone(&ty),
                        value,
                    };
                    (false, Some(Rc::new(default)))
                }
            };

            compiled.push(CompiledComponent {
                name: component.name.value.clone(),
                ty,
                optional,
                default,
            });
        }

        Ok(compiled)
    }
}

/// Names and numbers of an INTEGER or BIT STRING type
fn named_numbers(numbers: &[ast::NamedNumber]) -> Vec<(String, i64)> {
    numbers
        .iter()
        .filter_map(|n| Some((n.name.value.clone(), n.number.as_ref()?.value)))
        .collect()
}

/// Items of an enumeration.  Items without a number take the lowest number
/// not already used.
fn enumeration_items(items: &[ast::NamedNumber]) -> Vec<(String, i64)> {
    let mut used: Vec<i64> = items
        .iter()
        .filter_map(|i| i.number.as_ref().map(|n| n.value))
        .collect();

    let mut next = 0;
    items
        .iter()
        .map(|item| {
            let number = match &item.number {
                Some(number) => number.value,
                None => {
                    while used.contains(&next) {
                        next += 1;
                    }
                    used.push(next);
                    next
                }
            };
            (item.name.value.clone(), number)
        })
        .collect()
}
