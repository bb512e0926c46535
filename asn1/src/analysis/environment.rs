use tracing::debug;

use crate::{
    ast::{Assignment, Parameter, Setting, Spanned, Type},
    diagnostic::Span,
};

use super::{context::AnalysisContext, error::AnalysisError, table::Symbol, Result};

/// Bindings of the dummy parameters of one parameterized assignment
#[derive(Debug, Default)]
pub(super) struct Environment {
    bindings: Vec<Binding>,
}

#[derive(Debug)]
struct Binding {
    /// Name of the dummy parameter
    name: String,

    /// Location of the formal parameter
    span: Span,
    value: Symbol,

    /// Has the parameter been referenced within the assignment
    used: bool,
}

impl Environment {
    /// Get the value bound to a dummy parameter, marking it as used
    pub(super) fn lookup(&mut self, name: &str) -> Option<Symbol> {
        let binding = self.bindings.iter_mut().find(|b| b.name == name)?;
        binding.used = true;
        Some(binding.value.clone())
    }

    fn unused(&self) -> Option<&Binding> {
        self.bindings.iter().find(|b| !b.used)
    }
}

impl<'a> AnalysisContext<'a> {
    /// Compile a parameterized assignment with the given actual parameters.
    /// Actual parameters are compiled where they are written, the body of the
    /// assignment in the module it is defined in.  Every parameter must be
    /// used by the body.
    pub(super) fn instantiate(
        &mut self,
        module: usize,
        assignment: &'a Assignment,
        formal: &[Parameter],
        actual: &[Spanned<Setting>],
    ) -> Result<Symbol> {
        if self.environments.len() >= self.features.max_depth {
            return Err(AnalysisError::CyclicReference {
                name: assignment.name.value.clone(),
                span: assignment.name.span,
            });
        }

        let mut environment = Environment::default();
        for (parameter, setting) in formal.iter().zip(actual) {
            let value = self.actual_parameter(module, parameter, setting)?;
            environment.bindings.push(Binding {
                name: parameter.dummy.value.clone(),
                span: parameter.dummy.span,
                value,
                used: false,
            });
        }

        debug!(
            name = %assignment.name.value,
            parameters = formal.len(),
            "instantiating parameterized assignment"
        );

        self.environments.push(environment);
        let result = self.in_module(module, |this| {
            this.compile_assignment(Some(&assignment.name.value), assignment)
        });
        let environment = self.environments.pop();
        let symbol = result?;

        if let Some(unused) = environment.as_ref().and_then(Environment::unused) {
            return Err(AnalysisError::UnusedParameter {
                parameter: unused.name.clone(),
                assignment: assignment.name.value.clone(),
                span: unused.span,
            });
        }

        Ok(symbol)
    }

    /// Compile a single actual parameter.  The governor decides between a
    /// value or value set and an object or object set, the case of the dummy
    /// name decides between the single and the set forms.  Parameters without
    /// a governor are types or object classes.
    fn actual_parameter(
        &mut self,
        module: usize,
        parameter: &Parameter,
        setting: &Spanned<Setting>,
    ) -> Result<Symbol> {
        let dummy = &parameter.dummy.value;
        let single = dummy.chars().next().is_some_and(char::is_lowercase);

        let Some(governor) = &parameter.governor else {
            return match &setting.value {
                Setting::Type(Type::Reference(reference)) => match self.symbol(reference)? {
                    symbol @ (Symbol::Type(_) | Symbol::Class(_)) => Ok(symbol),
                    other => Err(AnalysisError::WrongKind {
                        name: reference.name.value.clone(),
                        expected: "a type or an object class",
                        found: other.describe(),
                        span: setting.span,
                    }),
                },
                _ => Ok(Symbol::Type(self.resolve_setting_type(dummy, setting)?)),
            };
        };

        let class = self.in_module(module, |this| this.probe_class(governor))?;
        let symbol = match class {
            Some(class) => {
                let class = self.class_by_ref(&class, governor.span)?;
                if single {
                    Symbol::Object(self.resolve_object(&class, setting, None)?)
                } else {
                    Symbol::ObjectSet(self.resolve_object_set(&class, setting, None)?)
                }
            }
            None => {
                let ty = self.in_module(module, |this| this.resolve_type(governor))?;
                if single {
                    Symbol::Value(self.resolve_typed_value(dummy, &ty, setting)?)
                } else {
                    Symbol::ValueSet(self.resolve_value_set(dummy, &ty, setting)?)
                }
            }
        };

        Ok(symbol)
    }
}
