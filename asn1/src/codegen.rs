use std::fmt::Write;

use convert_case::{Case, Casing};

use crate::analysis::{
    CompiledModule, CompiledObject, CompiledObjectClass, CompiledObjectSet, FieldKind,
    FieldOptionality, Model,
};

/// Generate a rust source listing from the compiled model
#[derive(Debug, Clone)]
struct RustCodegen<'a> {
    model: &'a Model,
    result: String,
}

#[derive(Debug, Clone, Copy)]
pub enum CodegenError {
    /// Error during write to string? should never occur
    FmtError(std::fmt::Error),
}

type Result<T = (), E = CodegenError> = std::result::Result<T, E>;

impl Model {
    /// Run the code generator to produce a rust source code listing to
    /// represent the information objects of the input files.
    pub fn rust_codegen(&self) -> Result<String> {
        RustCodegen {
            model: self,
            result: String::new(),
        }
        .run()
    }
}

impl RustCodegen<'_> {
    fn run(mut self) -> Result<String> {
        for module in self.model.modules() {
            self.module(module)?;
        }

        Ok(self.result)
    }

    fn module(&mut self, module: &CompiledModule) -> Result {
        writeln!(self.result, "mod {} {{", module.name().to_case(Case::Snake))?;

        let table = module.table();
        for (name, class) in table.classes() {
            self.class(name, class)?;
        }
        for (name, object) in table.objects() {
            self.object(name, object)?;
        }
        for (name, set) in table.object_sets() {
            self.object_set(name, set)?;
        }

        writeln!(self.result, "}}")?;

        Ok(())
    }

    /// One struct per class, with a doc comment per field
    fn class(&mut self, name: &str, class: &CompiledObjectClass) -> Result {
        // an alias shares its class with the original
        if name != class.name() {
            writeln!(
                self.result,
                "\ttype {} = {};",
                name.to_case(Case::Pascal),
                class.name().to_case(Case::Pascal)
            )?;
            return Ok(());
        }

        writeln!(self.result, "\tpub struct {} {{", name.to_case(Case::Pascal))?;
        for field in class.fields() {
            let optionality = match &field.optionality {
                FieldOptionality::Mandatory => String::new(),
                FieldOptionality::Optional => " OPTIONAL".to_string(),
                FieldOptionality::Default(value) => format!(" DEFAULT {value}"),
            };
            let governor = match field.kind() {
                FieldKind::FixedTypeValue { ty, unique: true } => format!(" {ty} UNIQUE"),
                FieldKind::FixedTypeValue { ty, .. } | FieldKind::FixedTypeValueSet { ty } => {
                    format!(" {ty}")
                }
                FieldKind::VariableTypeValue { governor }
                | FieldKind::VariableTypeValueSet { governor } => match class.field_by_id(*governor) {
                    Some(governor) => format!(" &{}", governor.name),
                    None => String::new(),
                },
                FieldKind::Object { class } | FieldKind::ObjectSet { class } => {
                    format!(" {}", class.name)
                }
                FieldKind::Type => String::new(),
            };

            writeln!(
                self.result,
                "\t\t/// {}: &{}{governor}{optionality}",
                field.kind().name(),
                field.name
            )?;
            writeln!(
                self.result,
                "\t\tpub {}: (),",
                field.name.to_case(Case::Snake)
            )?;
        }
        writeln!(self.result, "\t}}")?;

        Ok(())
    }

    /// One constant per object, with a doc comment per bound field
    fn object(&mut self, name: &str, object: &CompiledObject) -> Result {
        for (field, value) in object.fields() {
            writeln!(self.result, "\t/// &{} = {value}", field.name)?;
        }
        writeln!(
            self.result,
            "\tpub const {}: {} = {} {{",
            name.to_case(Case::ScreamingSnake),
            object.class().name().to_case(Case::Pascal),
            object.class().name().to_case(Case::Pascal)
        )?;
        for field in object.class().fields() {
            writeln!(self.result, "\t\t{}: (),", field.name.to_case(Case::Snake))?;
        }
        writeln!(self.result, "\t}};")?;

        Ok(())
    }

    /// One constant per object set, listing the names of its members
    fn object_set(&mut self, name: &str, set: &CompiledObjectSet) -> Result {
        let members: Vec<_> = set
            .objects
            .iter()
            .map(|o| match o.name() {
                Some(name) => name.to_case(Case::ScreamingSnake),
                None => "_".to_string(),
            })
            .map(|name| format!("\"{name}\""))
            .collect();

        if set.extensible {
            writeln!(self.result, "\t/// extensible")?;
        }
        writeln!(
            self.result,
            "\tpub const {}: &[&str] = &[{}];",
            name.to_case(Case::ScreamingSnake),
            members.join(", ")
        )?;

        Ok(())
    }
}

impl From<std::fmt::Error> for CodegenError {
    fn from(value: std::fmt::Error) -> Self {
        Self::FmtError(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::AsnCompiler;

    #[test]
    fn listing() {
        let mut compiler = AsnCompiler::new();
        compiler
            .add_file(
                "test.asn1".to_string(),
                "My-Module DEFINITIONS ::= BEGIN
                    ERROR-CLASS ::= CLASS { &code INTEGER UNIQUE, &Type OPTIONAL }
                        WITH SYNTAX { CODE &code [TYPE &Type] }
                    not-found ERROR-CLASS ::= { CODE 404 }
                    Errors ERROR-CLASS ::= { not-found, ... }
                END"
                .to_string(),
            )
            .unwrap();

        let listing = compiler.analysis().unwrap().rust_codegen().unwrap();
        assert!(listing.starts_with("mod my_module {"));
        assert!(listing.contains("pub struct ErrorClass {"));
        assert!(listing.contains("/// fixed type value field: &code INTEGER UNIQUE"));
        assert!(listing.contains("/// &code = 404"));
        assert!(listing.contains("pub const NOT_FOUND: ErrorClass"));
        assert!(listing.contains("pub const ERRORS: &[&str] = &[\"NOT_FOUND\"];"));
    }
}
