use std::{fmt::Display, rc::Rc};

use crate::ast::{self, OidComponent, Setting, Spanned};

use super::{
    context::AnalysisContext, error::AnalysisError, table::Symbol, ty::CompiledType, Result,
};

/// A value that has been checked against its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Boolean(bool),
    Null,
    Integer(i64),

    /// Name of the enumeration item
    Enumerated(String),

    /// Binary digits
    BitString(String),

    /// Named bits that are set
    NamedBits(Vec<String>),

    /// Hexadecimal digits
    OctetString(String),

    /// All arcs of an OBJECT IDENTIFIER or RELATIVE-OID
    ObjectIdentifier(Vec<u64>),
    CharacterString(String),

    /// Component values of a SEQUENCE or SET, including defaulted components,
    /// in the order of the type's components
    Sequence(Vec<(String, ResolvedValue)>),

    /// Elements of a SEQUENCE OF or SET OF
    SequenceOf(Vec<ResolvedValue>),
    Choice {
        alternative: String,
        value: Box<ResolvedValue>,
    },
}

/// A value along with the type it was checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub ty: Rc<CompiledType>,
    pub value: ResolvedValue,
}

/// A set of values of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledValueSet {
    pub ty: Rc<CompiledType>,
    pub values: Vec<ResolvedValue>,
    pub extensible: bool,
}

/// Well known names for the first arcs of an object identifier
const OID_ROOTS: &[(&str, u64)] = &[
    ("itu-t", 0),
    ("ccitt", 0),
    ("iso", 1),
    ("joint-iso-itu-t", 2),
    ("joint-iso-ccitt", 2),
];

/// Well known names for the second arcs of an object identifier, by root arc
const OID_SECOND_ARCS: &[(u64, &str, u64)] = &[
    (0, "recommendation", 0),
    (0, "question", 1),
    (0, "administration", 2),
    (0, "network-operator", 3),
    (0, "identified-organization", 4),
    (1, "standard", 0),
    (1, "registration-authority", 1),
    (1, "member-body", 2),
    (1, "identified-organization", 3),
];

impl<'a> AnalysisContext<'a> {
    /// Check a value against its governing type
    pub(super) fn resolve_value(
        &mut self,
        ty: &Rc<CompiledType>,
        value: &Spanned<ast::Value>,
    ) -> Result<ResolvedValue> {
        let mismatch = || AnalysisError::TypeMismatch {
            expected: ty.to_string(),
            found: value.value.describe(),
            span: value.span,
        };

        if let ast::Value::Reference(reference) = &value.value {
            if let Some(named) = named_value(ty.base(), reference) {
                return Ok(named);
            }

            return match self.symbol(reference)? {
                Symbol::Value(referenced) if ty.compatible(&referenced.ty) => {
                    Ok(referenced.value.clone())
                }
                Symbol::Value(referenced) => Err(AnalysisError::TypeMismatch {
                    expected: ty.to_string(),
                    found: format!("a value of type {}", referenced.ty),
                    span: value.span,
                }),
                other => Err(AnalysisError::WrongKind {
                    name: reference.name.value.clone(),
                    expected: "a value",
                    found: other.describe(),
                    span: value.span,
                }),
            };
        }

        let resolved = match (ty.base(), &value.value) {
            (CompiledType::Boolean, ast::Value::Boolean(b)) => ResolvedValue::Boolean(*b),
            (CompiledType::Null, ast::Value::Null) => ResolvedValue::Null,
            (CompiledType::Integer(_) | CompiledType::Real, ast::Value::Number(n)) => {
                ResolvedValue::Integer(*n)
            }
            (CompiledType::BitString(_), ast::Value::BString(bits)) => {
                ResolvedValue::BitString(bits.clone())
            }
            (CompiledType::BitString(_), ast::Value::HString(hex)) => {
                ResolvedValue::BitString(hex_to_bits(hex))
            }
            (CompiledType::BitString(named), ast::Value::Braced(braced)) => {
                let names = self.parse_braced(braced, |p| p.value_list())?;
                let mut bits = vec![];
                for name in names {
                    match &name.value {
                        ast::Value::Reference(r)
                            if named.iter().any(|(n, _)| *n == r.name.value) =>
                        {
                            bits.push(r.name.value.clone())
                        }
                        _ => {
                            return Err(AnalysisError::TypeMismatch {
                                expected: ty.to_string(),
                                found: name.value.describe(),
                                span: name.span,
                            })
                        }
                    }
                }
                ResolvedValue::NamedBits(bits)
            }
            (CompiledType::OctetString, ast::Value::HString(hex)) => {
                ResolvedValue::OctetString(hex.to_ascii_uppercase())
            }
            (CompiledType::OctetString, ast::Value::BString(bits)) => {
                ResolvedValue::OctetString(bits_to_hex(bits))
            }
            (CompiledType::ObjectIdentifier, ast::Value::Braced(braced)) => {
                let components = self.parse_braced(braced, |p| p.oid_components())?;
                ResolvedValue::ObjectIdentifier(self.oid_arcs(&components, true)?)
            }
            (CompiledType::RelativeOid, ast::Value::Braced(braced)) => {
                let components = self.parse_braced(braced, |p| p.oid_components())?;
                ResolvedValue::ObjectIdentifier(self.oid_arcs(&components, false)?)
            }
            (CompiledType::CharacterString(_), ast::Value::CString(text)) => {
                ResolvedValue::CharacterString(text.clone())
            }
            (
                CompiledType::Sequence(components) | CompiledType::Set(components),
                ast::Value::Braced(braced),
            ) => {
                let values = self.parse_braced(braced, |p| p.named_value_list())?;

                for (name, _) in &values {
                    if !components.iter().any(|c| c.name == name.value) {
                        return Err(AnalysisError::TypeMismatch {
                            expected: ty.to_string(),
                            found: format!("a value with an unknown component `{}`", name.value),
                            span: name.span,
                        });
                    }
                }

                let mut resolved = vec![];
                for component in components {
                    let given = values.iter().find(|(name, _)| name.value == component.name);
                    match (given, &component.default) {
                        (Some((_, value)), _) => {
                            let value = self.resolve_value(&component.ty, value)?;
                            resolved.push((component.name.clone(), value));
                        }
                        (None, Some(default)) => {
                            resolved.push((component.name.clone(), default.value.clone()))
                        }
                        (None, None) if component.optional => (),
                        (None, None) => {
                            return Err(AnalysisError::TypeMismatch {
                                expected: ty.to_string(),
                                found: format!(
                                    "a value without the component `{}`",
                                    component.name
                                ),
                                span: value.span,
                            })
                        }
                    }
                }

                ResolvedValue::Sequence(resolved)
            }
            (
                CompiledType::SequenceOf(element) | CompiledType::SetOf(element),
                ast::Value::Braced(braced),
            ) => {
                let values = self.parse_braced(braced, |p| p.value_list())?;
                let mut resolved = Vec::with_capacity(values.len());
                for value in &values {
                    resolved.push(self.resolve_value(element, value)?);
                }
                ResolvedValue::SequenceOf(resolved)
            }
            (CompiledType::Choice(alternatives), ast::Value::Choice { alternative, value }) => {
                let Some(chosen) = alternatives.iter().find(|a| a.name == alternative.value)
                else {
                    return Err(AnalysisError::TypeMismatch {
                        expected: ty.to_string(),
                        found: format!("an unknown alternative `{}`", alternative.value),
                        span: alternative.span,
                    });
                };
                ResolvedValue::Choice {
                    alternative: alternative.value.clone(),
                    value: Box::new(self.resolve_value(&chosen.ty, value)?),
                }
            }
            (CompiledType::Open, literal) => match literal {
                ast::Value::Boolean(b) => ResolvedValue::Boolean(*b),
                ast::Value::Null => ResolvedValue::Null,
                ast::Value::Number(n) => ResolvedValue::Integer(*n),
                ast::Value::CString(text) => ResolvedValue::CharacterString(text.clone()),
                ast::Value::BString(bits) => ResolvedValue::BitString(bits.clone()),
                ast::Value::HString(hex) => ResolvedValue::OctetString(hex.clone()),
                _ => {
                    return Err(AnalysisError::Unsupported {
                        feature: "structured values of open types",
                        span: value.span,
                    })
                }
            },
            _ => return Err(mismatch()),
        };

        Ok(resolved)
    }

    /// Check a setting that must be a value, wrapping it with its type
    pub(super) fn resolve_typed_value(
        &mut self,
        field: &str,
        ty: &Rc<CompiledType>,
        setting: &Spanned<Setting>,
    ) -> Result<Rc<TypedValue>> {
        let value = match &setting.value {
            Setting::Value(value) => Spanned::new(value.clone(), setting.span),
            Setting::Type(ast::Type::Null) => Spanned::new(ast::Value::Null, setting.span),
            Setting::Type(_) => {
                return Err(AnalysisError::SettingKindMismatch {
                    field: field.to_string(),
                    expected: format!("a value of type {ty}"),
                    found: setting.value.describe(),
                    span: setting.span,
                })
            }
        };

        let resolved = self.resolve_value(ty, &value)?;
        Ok(Rc::new(TypedValue {
            ty: Rc::clone(ty),
            value: resolved,
        }))
    }

    /// Resolve a value set, either written in braces or a reference to a
    /// value set assignment
    pub(super) fn resolve_value_set(
        &mut self,
        field: &str,
        ty: &Rc<CompiledType>,
        setting: &Spanned<Setting>,
    ) -> Result<Rc<CompiledValueSet>> {
        match &setting.value {
            Setting::Value(ast::Value::Braced(braced)) => {
                let spec = self.parse_braced(braced, |p| p.value_set_spec())?;

                let mut values = Vec::with_capacity(spec.values.len());
                for value in &spec.values {
                    values.push(self.resolve_value(ty, value)?);
                }

                Ok(Rc::new(CompiledValueSet {
                    ty: Rc::clone(ty),
                    values,
                    extensible: spec.extensible,
                }))
            }
            Setting::Type(ast::Type::Reference(reference)) => match self.symbol(reference)? {
                Symbol::ValueSet(set) if ty.compatible(&set.ty) => Ok(set),
                Symbol::ValueSet(set) => Err(AnalysisError::TypeMismatch {
                    expected: ty.to_string(),
                    found: format!("a value set of type {}", set.ty),
                    span: setting.span,
                }),
                other => Err(AnalysisError::WrongKind {
                    name: reference.name.value.clone(),
                    expected: "a value set",
                    found: other.describe(),
                    span: setting.span,
                }),
            },
            other => Err(AnalysisError::SettingKindMismatch {
                field: field.to_string(),
                expected: format!("a value set of type {ty}"),
                found: other.describe(),
                span: setting.span,
            }),
        }
    }

    /// Compute the arcs of an object identifier.  Only an absolute object
    /// identifier can start with a well known root name or a reference to
    /// another object identifier.
    fn oid_arcs(&mut self, components: &[OidComponent], absolute: bool) -> Result<Vec<u64>> {
        let mut arcs: Vec<u64> = vec![];

        for (i, component) in components.iter().enumerate() {
            if let Some(number) = &component.number {
                arcs.push(number.value);
                continue;
            }

            let Some(name) = &component.name else {
                continue;
            };

            if absolute && i == 0 {
                if let Some((_, arc)) = OID_ROOTS.iter().find(|(n, _)| *n == name.value) {
                    arcs.push(*arc);
                    continue;
                }
            }

            if absolute && i == 1 && arcs.len() == 1 {
                let known = OID_SECOND_ARCS
                    .iter()
                    .find(|(root, n, _)| *root == arcs[0] && *n == name.value);
                if let Some((_, _, arc)) = known {
                    arcs.push(*arc);
                    continue;
                }
            }

            let reference = ast::Reference::simple(name.clone());
            let referenced = match self.symbol(&reference)? {
                Symbol::Value(value) => value,
                other => {
                    return Err(AnalysisError::WrongKind {
                        name: name.value.clone(),
                        expected: "a value",
                        found: other.describe(),
                        span: name.span,
                    })
                }
            };

            match (&referenced.value, i) {
                (ResolvedValue::ObjectIdentifier(prefix), 0) => arcs.extend(prefix),
                (ResolvedValue::Integer(n), _) if *n >= 0 => arcs.push(*n as u64),
                _ => {
                    return Err(AnalysisError::TypeMismatch {
                        expected: if i == 0 {
                            "OBJECT IDENTIFIER or INTEGER".to_string()
                        } else {
                            "INTEGER".to_string()
                        },
                        found: format!("a value of type {}", referenced.ty),
                        span: name.span,
                    })
                }
            }
        }

        Ok(arcs)
    }
}

/// An enumeration item or named number written where a value is expected
fn named_value(ty: &CompiledType, reference: &ast::Reference) -> Option<ResolvedValue> {
    if reference.module.is_some() || reference.actual_parameters.is_some() {
        return None;
    }
    let name = &reference.name.value;

    match ty {
        CompiledType::Enumerated { items, .. } => items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, _)| ResolvedValue::Enumerated(n.clone())),
        CompiledType::Integer(numbers) => numbers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| ResolvedValue::Integer(*v)),
        _ => None,
    }
}

/// Convert hexadecimal digits to binary digits
fn hex_to_bits(hex: &str) -> String {
    hex.chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| format!("{d:04b}"))
        .collect()
}

/// Convert binary digits to hexadecimal digits, padding the last octet with
/// trailing zeros
fn bits_to_hex(bits: &str) -> String {
    let mut bits = bits.to_string();
    while bits.len() % 8 != 0 {
        bits.push('0');
    }

    bits.as_bytes()
        .chunks(4)
        .map(|nibble| {
            let value = nibble
                .iter()
                .fold(0, |acc, b| (acc << 1) | u32::from(*b == b'1'));
            char::from_digit(value, 16)
                .unwrap_or('0')
                .to_ascii_uppercase()
        })
        .collect()
}

impl Display for ResolvedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedValue::Boolean(true) => write!(f, "TRUE"),
            ResolvedValue::Boolean(false) => write!(f, "FALSE"),
            ResolvedValue::Null => write!(f, "NULL"),
            ResolvedValue::Integer(n) => write!(f, "{n}"),
            ResolvedValue::Enumerated(name) => write!(f, "{name}"),
            ResolvedValue::BitString(bits) => write!(f, "'{bits}'B"),
            ResolvedValue::OctetString(hex) => write!(f, "'{hex}'H"),
            ResolvedValue::CharacterString(text) => write!(f, "{text:?}"),
            ResolvedValue::NamedBits(names) => write!(f, "{{ {} }}", names.join(", ")),
            ResolvedValue::ObjectIdentifier(arcs) => {
                write!(f, "{{")?;
                for arc in arcs {
                    write!(f, " {arc}")?;
                }
                write!(f, " }}")
            }
            ResolvedValue::Sequence(components) => {
                write!(f, "{{")?;
                for (i, (name, value)) in components.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{name} {value}")?;
                }
                write!(f, " }}")
            }
            ResolvedValue::SequenceOf(values) => {
                write!(f, "{{")?;
                for (i, value) in values.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{value}")?;
                }
                write!(f, " }}")
            }
            ResolvedValue::Choice { alternative, value } => write!(f, "{alternative} : {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_conversions() {
        assert_eq!(hex_to_bits("A1"), "10100001");
        assert_eq!(bits_to_hex("1010"), "A0");
        assert_eq!(bits_to_hex("0000000111111111"), "01FF");
    }

    #[test]
    fn display() {
        let value = ResolvedValue::Sequence(vec![
            ("a".to_string(), ResolvedValue::Integer(1)),
            (
                "b".to_string(),
                ResolvedValue::ObjectIdentifier(vec![1, 2, 3]),
            ),
        ]);
        assert_eq!(value.to_string(), "{ a 1, b { 1 2 3 } }");
    }
}
