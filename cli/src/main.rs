mod error;

use std::{error::Error, fs, path::PathBuf, process::ExitCode};

use asn1::{AsnCompiler, Diagnostic, Symbol};
use clap::Parser;
use tracing::info;

use crate::error::{to_error, AsnCompilerCache};

/// Check ASN.1 modules that use information object classes, objects and
/// object sets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The ASN.1 source files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Accept keywords written in lowercase
    #[arg(long)]
    lowercase_keywords: bool,

    /// Accept non-ascii characters in identifiers
    #[arg(long)]
    unicode_identifiers: bool,

    /// Accept unicode whitespace between tokens
    #[arg(long)]
    unicode_whitespace: bool,

    /// Maximum nesting depth of the parser and of parameterized assignments
    #[arg(long, default_value_t = 100)]
    max_depth: usize,

    /// Print a rust listing of the compiled information objects
    #[arg(long)]
    rust: bool,

    /// Print every compiled assignment
    #[arg(long)]
    print_model: bool,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut compiler = AsnCompiler::new();
    compiler.lowercase_keywords = args.lowercase_keywords;
    compiler.unicode_identifiers = args.unicode_identifiers;
    compiler.unicode_whitespace = args.unicode_whitespace;
    compiler.max_depth = args.max_depth;

    for path in &args.files {
        let source = fs::read_to_string(path)?;
        let name = path.display().to_string();
        info!(file = %name, "adding source file");

        if let Err(err) = compiler.add_file(name, source) {
            report(&compiler, err.into())?;
            return Ok(ExitCode::FAILURE);
        }
    }

    let model = match compiler.analysis() {
        Ok(model) => model,
        Err(err) => {
            report(&compiler, err.into())?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.print_model {
        for module in model.modules() {
            println!("{}:", module.name());
            for (name, symbol) in module.table().iter() {
                match symbol {
                    Symbol::Type(ty) => println!("  {name} ::= {ty}"),
                    Symbol::Value(value) => println!("  {name} {} ::= {}", value.ty, value.value),
                    Symbol::Object(object) => {
                        println!("  {name} {} ::= {{", object.class().name());
                        for (field, value) in object.fields() {
                            println!("    &{} {value}", field.name);
                        }
                        println!("  }}");
                    }
                    Symbol::ObjectSet(set) => {
                        let set = asn1::CompiledObjectSet {
                            name: None,
                            ..(**set).clone()
                        };
                        println!("  {name} {} ::= {set}", set.class.name());
                    }
                    other => println!("  {name}: {}", other.describe()),
                }
            }
        }
    }

    if args.rust {
        match model.rust_codegen() {
            Ok(listing) => print!("{listing}"),
            Err(err) => {
                eprintln!("unable to generate rust listing: {err:?}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a diagnostic to stderr, falling back to plain text when it has no
/// source location.
fn report(compiler: &AsnCompiler, diag: Diagnostic) -> Result<(), Box<dyn Error>> {
    match to_error(&diag) {
        Ok(report) => report.eprint(AsnCompilerCache::new(compiler))?,
        Err(_) => eprintln!("{diag}"),
    }

    Ok(())
}
