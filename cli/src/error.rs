use std::{collections::HashMap, error::Error, ops::Range};

use ariadne::{Config, IndexType, ReportKind};
use asn1::{AsnCompiler, Diagnostic, SourceId};

type Report = ariadne::Report<'static, (SourceId, Range<usize>)>;

/// Convert a compiler diagnostic into a report that can be printed with the
/// source it refers to.  The first label with a location is the primary one,
/// labels without a location become notes.
pub fn to_error(diag: &Diagnostic) -> Result<Report, Box<dyn Error>> {
    let Some(primary) = diag.primary_span() else {
        return Err("diagnostic has no source location".into());
    };

    let mut report = Report::build(ReportKind::Error, primary.source, primary.start)
        .with_code(diag.error_code)
        .with_message(&diag.name)
        .with_config(Config::default().with_index_type(IndexType::Byte));

    let mut notes = vec![];
    for label in &diag.labels {
        match label.span {
            Some(span) => report.add_label(
                ariadne::Label::new((span.source, span.start..span.end))
                    .with_message(&label.message),
            ),
            None => notes.push(label.message.as_str()),
        }
    }

    if !notes.is_empty() {
        report.set_note(notes.join("\n"));
    }

    Ok(report.finish())
}

/// Source text of every file added to a compiler, for printing reports
pub struct AsnCompilerCache<'a> {
    cache: HashMap<SourceId, ariadne::Source<&'a str>>,
    compiler: &'a AsnCompiler,
}

impl<'a> ariadne::Cache<SourceId> for AsnCompilerCache<'a> {
    type Storage = &'a str;

    fn fetch(
        &mut self,
        id: &SourceId,
    ) -> Result<&ariadne::Source<Self::Storage>, Box<dyn std::fmt::Debug + '_>> {
        let compiler = self.compiler;
        Ok(self
            .cache
            .entry(*id)
            .or_insert_with(|| ariadne::Source::from(compiler.source_text(*id))))
    }

    fn display<'b>(&self, id: &'b SourceId) -> Option<Box<dyn std::fmt::Display + 'b>> {
        Some(Box::new(self.compiler.source_name(*id).to_string()))
    }
}

impl<'a> AsnCompilerCache<'a> {
    pub fn new(compiler: &'a AsnCompiler) -> Self {
        AsnCompilerCache {
            cache: HashMap::new(),
            compiler,
        }
    }
}
