//! The primary interface to all the ASN.1 parsing, analysis, codegen and other tools.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::{
    analysis::{AnalysisContext, AnalysisError, Model},
    ast::ModuleDefinition,
    lexer::Lexer,
    parser::{Parser, ParserError},
};

/// Store of all information relating to a whole ASN.1 specification, including
/// multiple files, analysis and code generation.
#[derive(Debug, Clone, Default)]
pub struct AsnCompiler {
    /// List of all included source files.
    sources: Vec<Source>,

    /// The enabled features.
    features: Features,
}

/// All features that can be enabled within the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Features {
    /// Allow both upper and lowercase keywords.
    pub lowercase_keywords: bool,

    /// Allow non-ascii characters in identifiers.  Identifiers are compared
    /// after NFC normalisation.
    pub unicode_identifiers: bool,

    /// Allow further whitespace characters
    pub unicode_whitespace: bool,

    /// Maximum nesting depth of the parser before it gives up, to avoid
    /// overflowing the stack on deeply nested input.
    pub max_depth: usize,
}

/// Information relating to a single source file
#[derive(Debug, Clone)]
pub(crate) struct Source {
    /// File name and path.
    pub(crate) file_name: String,

    /// Source text of the file
    pub(crate) source: String,

    /// All modules defined within the file
    pub(crate) modules: Vec<ModuleDefinition>,
}

/// Reference to a single source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(usize);

impl Default for Features {
    fn default() -> Self {
        Features {
            lowercase_keywords: false,
            unicode_identifiers: false,
            unicode_whitespace: false,
            max_depth: 100,
        }
    }
}

impl AsnCompiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a new file to the compiler.  Will parse the file, but will not run
    /// any analysis that is required to check that the source files are valid.
    pub fn add_file(&mut self, file_name: String, source: String) -> Result<SourceId, ParserError> {
        let id = SourceId(self.sources.len());

        let lexer = Lexer::new(id, &source, self.features);
        let modules = Parser::from_lexer(lexer, self.features)?.run()?;
        debug!(file = %file_name, modules = modules.len(), "parsed source file");

        self.sources.push(Source {
            file_name,
            source,
            modules,
        });

        Ok(id)
    }

    /// Get an iterator over all sources
    pub(crate) fn all_sources(&self) -> impl Iterator<Item = &Source> + '_ {
        self.sources.iter()
    }

    /// Get the source associated with a source id
    #[inline]
    pub(crate) fn source(&self, file: SourceId) -> &Source {
        &self.sources[file.0]
    }

    /// Get the text of a source file
    pub fn source_text(&self, file: SourceId) -> &str {
        &self.source(file).source
    }

    /// Get the file name of a source file
    pub fn source_name(&self, file: SourceId) -> &str {
        &self.source(file).file_name
    }

    /// Run static analysis of all the provided source files, producing the
    /// compiled model.  Stops at the first error found.
    pub fn analysis(&self) -> Result<Model, AnalysisError> {
        AnalysisContext::new(self)?.run()
    }
}

impl SourceId {
    #[cfg(test)]
    pub(crate) fn test() -> Self {
        SourceId(0)
    }
}

impl Deref for AsnCompiler {
    type Target = Features;

    fn deref(&self) -> &Self::Target {
        &self.features
    }
}

impl DerefMut for AsnCompiler {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.features
    }
}
