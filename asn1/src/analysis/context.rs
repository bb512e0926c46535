use std::{collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    ast::{Assignment, AssignmentKind, Braced, ModuleDefinition, Reference, Setting, Spanned, Value},
    compiler::{AsnCompiler, Features},
    parser::{self, Parser},
};

use super::{
    environment::Environment, error::AnalysisError, table::Symbol, CompiledModule, Model,
    Result, SymbolTable,
};

/// Data used and produced by static analysis of source files.  Assignments
/// are compiled on demand, so may be used before they are defined.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    /// Enabled language extensions, used when parsing braced groups
    pub(super) features: Features,

    /// Every module of every source file, in the order they were added
    modules: Vec<ModuleState<'a>>,

    /// Module name to position in `modules`
    module_index: HashMap<&'a str, usize>,

    /// Assignments currently being compiled, used to detect cycles
    in_progress: Vec<(usize, &'a str)>,

    /// Bindings of the dummy parameters of parameterized assignments being
    /// compiled, innermost last
    pub(super) environments: Vec<Environment>,

    /// The module names are resolved in
    current: usize,
}

/// Analysis state of a single module
#[derive(Debug)]
struct ModuleState<'a> {
    ast: &'a ModuleDefinition,

    /// Assignments by name
    assignments: HashMap<&'a str, &'a Assignment>,

    /// Imported symbol name to the module it is imported from
    imports: HashMap<&'a str, &'a Spanned<String>>,

    /// Every compiled assignment
    table: SymbolTable,
}

impl<'a> AnalysisContext<'a> {
    /// Create a new analysis context over every module of the compiler
    pub(crate) fn new(compiler: &'a AsnCompiler) -> Result<Self> {
        let mut modules = vec![];
        let mut module_index = HashMap::new();

        for source in compiler.all_sources() {
            for ast in &source.modules {
                if module_index
                    .insert(ast.name.value.as_str(), modules.len())
                    .is_some()
                {
                    return Err(AnalysisError::DuplicateModule {
                        name: ast.name.value.clone(),
                        span: ast.name.span,
                    });
                }

                modules.push(ModuleState::new(ast)?);
            }
        }

        Ok(Self {
            features: **compiler,
            modules,
            module_index,
            in_progress: vec![],
            environments: vec![],
            current: 0,
        })
    }

    /// Compile every assignment of every module.  Parameterized assignments
    /// are only compiled where they are used.
    pub(crate) fn run(mut self) -> Result<Model> {
        for module in 0..self.modules.len() {
            let ast = self.modules[module].ast;
            for assignment in &ast.assignments {
                if !assignment.is_parameterized() {
                    self.compile_named(module, assignment)?;
                }
            }
        }

        let modules = self
            .modules
            .into_iter()
            .map(|module| CompiledModule {
                name: module.ast.name.value.clone(),
                table: module.table,
            })
            .collect();

        Ok(Model { modules })
    }

    /// Name of the module names are currently resolved in
    pub(super) fn current_module(&self) -> &str {
        self.module_name(self.current)
    }

    pub(super) fn module_name(&self, module: usize) -> &str {
        &self.modules[module].ast.name.value
    }

    /// Find the assignment a reference refers to, along with the module it is
    /// defined in.  Unqualified names are looked up in the current module,
    /// then in its imports.
    pub(super) fn locate(&self, reference: &Reference) -> Result<(usize, &'a Assignment)> {
        let name = &reference.name;

        let module = match &reference.module {
            Some(module) => self.module_by_name(module)?,
            None => {
                let current = &self.modules[self.current];
                if let Some(assignment) = current.assignments.get(name.value.as_str()) {
                    return Ok((self.current, *assignment));
                }

                match current.imports.get(name.value.as_str()) {
                    Some(module) => self.module_by_name(module)?,
                    None => {
                        return Err(AnalysisError::UndefinedReference {
                            name: name.value.clone(),
                            span: name.span,
                        })
                    }
                }
            }
        };

        match self.modules[module].assignments.get(name.value.as_str()) {
            Some(assignment) => Ok((module, *assignment)),
            None => Err(AnalysisError::UndefinedReference {
                name: name.value.clone(),
                span: name.span,
            }),
        }
    }

    fn module_by_name(&self, name: &Spanned<String>) -> Result<usize> {
        self.module_index
            .get(name.value.as_str())
            .copied()
            .ok_or_else(|| AnalysisError::UnknownModule {
                name: name.value.clone(),
                span: name.span,
            })
    }

    /// Resolve a reference to anything, compiling it if required.  Dummy
    /// parameters of the assignment being instantiated are checked first.
    pub(super) fn symbol(&mut self, reference: &Reference) -> Result<Symbol> {
        if reference.module.is_none() {
            if let Some(symbol) = self.lookup_dummy(&reference.name.value) {
                if reference.actual_parameters.is_some() {
                    return Err(AnalysisError::Unsupported {
                        feature: "parameterized dummy references",
                        span: reference.name.span,
                    });
                }
                return Ok(symbol);
            }
        }

        let (module, assignment) = self.locate(reference)?;

        match (&assignment.parameters, &reference.actual_parameters) {
            (None, None) => self.compile_named(module, assignment),
            (Some(formal), Some(actual)) if formal.len() == actual.len() => {
                self.instantiate(module, assignment, formal, actual)
            }
            (formal, actual) => Err(AnalysisError::ParameterCountMismatch {
                name: reference.name.value.clone(),
                expected: formal.as_ref().map_or(0, Vec::len),
                found: actual.as_ref().map_or(0, Vec::len),
                span: reference.name.span,
            }),
        }
    }

    /// Look up a dummy parameter of the innermost parameterized assignment
    /// being compiled
    pub(super) fn lookup_dummy(&mut self, name: &str) -> Option<Symbol> {
        self.environments.last_mut()?.lookup(name)
    }

    /// Compile an assignment that is not parameterized, using the result from
    /// a previous compilation if there is one
    fn compile_named(&mut self, module: usize, assignment: &'a Assignment) -> Result<Symbol> {
        let name = assignment.name.value.as_str();
        if let Some(symbol) = self.modules[module].table.get(name) {
            return Ok(symbol.clone());
        }

        if self.in_progress.contains(&(module, name)) {
            return Err(AnalysisError::CyclicReference {
                name: name.to_string(),
                span: assignment.name.span,
            });
        }

        self.in_progress.push((module, name));
        let environments = std::mem::take(&mut self.environments);
        let current = std::mem::replace(&mut self.current, module);

        let result = self.compile_assignment(Some(name), assignment);

        self.current = current;
        self.environments = environments;
        self.in_progress.pop();

        let symbol = result?;
        debug!(
            module = self.module_name(module),
            name,
            kind = symbol.describe(),
            "compiled assignment"
        );

        self.modules[module]
            .table
            .insert(name.to_string(), symbol.clone());
        Ok(symbol)
    }

    /// Compile the right hand side of an assignment.  Whether the governor
    /// names an object class decides if a value assignment is an object
    /// assignment, and if a set assignment is an object set assignment.
    pub(super) fn compile_assignment(
        &mut self,
        name: Option<&str>,
        assignment: &Assignment,
    ) -> Result<Symbol> {
        let symbol = match &assignment.kind {
            AssignmentKind::ObjectClass(defn) => {
                Symbol::Class(Rc::new(self.compile_class(&assignment.name, defn)?))
            }
            AssignmentKind::Type(ty) => match self.probe_class(ty)? {
                Some(class) => Symbol::Class(self.class_by_ref(&class, ty.span)?),
                None => Symbol::Type(self.resolve_type(ty)?),
            },
            AssignmentKind::Value { governor, value } => {
                let setting = value.clone().map(Setting::Value);
                match self.probe_class(governor)? {
                    Some(class) => {
                        let class = self.class_by_ref(&class, governor.span)?;
                        Symbol::Object(self.resolve_object(&class, &setting, name)?)
                    }
                    None => {
                        let ty = self.resolve_type(governor)?;
                        let label = name.unwrap_or(assignment.name.value.as_str());
                        Symbol::Value(self.resolve_typed_value(label, &ty, &setting)?)
                    }
                }
            }
            AssignmentKind::Set { governor, set } => match self.probe_class(governor)? {
                Some(class) => {
                    let class = self.class_by_ref(&class, governor.span)?;
                    Symbol::ObjectSet(Rc::new(self.compile_object_set(name, &class, set)?))
                }
                None => {
                    let ty = self.resolve_type(governor)?;
                    let label = name.unwrap_or(assignment.name.value.as_str());
                    let setting = Spanned::new(Setting::Value(Value::Braced(set.clone())), set.span);
                    Symbol::ValueSet(self.resolve_value_set(label, &ty, &setting)?)
                }
            },
        };

        Ok(symbol)
    }

    /// Run a function with names resolved in another module
    pub(super) fn in_module<T>(&mut self, module: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        let current = std::mem::replace(&mut self.current, module);
        let result = f(self);
        self.current = current;
        result
    }

    /// Parse the contents of a braced group once it is known what it contains
    pub(super) fn parse_braced<T>(
        &self,
        braced: &Braced,
        f: impl FnOnce(&mut Parser<'_>) -> parser::Result<T>,
    ) -> Result<T> {
        let mut parser = Parser::from_braced(braced, self.features);
        let result = f(&mut parser)?;
        parser.finish()?;
        Ok(result)
    }
}

impl<'a> ModuleState<'a> {
    fn new(ast: &'a ModuleDefinition) -> Result<Self> {
        let mut assignments = HashMap::new();
        for assignment in &ast.assignments {
            if assignments
                .insert(assignment.name.value.as_str(), assignment)
                .is_some()
            {
                return Err(AnalysisError::DuplicateAssignment {
                    name: assignment.name.value.clone(),
                    span: assignment.name.span,
                });
            }
        }

        let imports = ast
            .imports
            .iter()
            .flat_map(|import| {
                import
                    .symbols
                    .iter()
                    .map(move |symbol| (symbol.value.as_str(), &import.module))
            })
            .collect();

        Ok(ModuleState {
            ast,
            assignments,
            imports,
            table: SymbolTable::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{analysis::AnalysisError, compiler::AsnCompiler};

    use super::AnalysisContext;

    #[test]
    fn failed_assignment_is_not_recorded() {
        let mut compiler = AsnCompiler::new();
        compiler
            .add_file(
                "test.asn1".to_string(),
                "M DEFINITIONS ::= BEGIN C ::= CLASS { &id INTEGER, &id BOOLEAN } END".to_string(),
            )
            .unwrap();

        let mut context = AnalysisContext::new(&compiler).unwrap();
        let ast = context.modules[0].ast;
        let assignment = &ast.assignments[0];

        let err = context.compile_named(0, assignment).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateField { .. }));
        assert!(context.modules[0].table.get("C").is_none());
        assert!(context.in_progress.is_empty());

        // compiled again rather than reported as a cycle
        assert_eq!(context.compile_named(0, assignment).unwrap_err(), err);
    }
}
