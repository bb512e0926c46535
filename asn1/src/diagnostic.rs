use std::{error::Error, fmt::Display};

use crate::compiler::SourceId;

/// A compiler error, in a form that can be shown next to the source it
/// refers to
#[derive(Debug)]
pub struct Diagnostic {
    /// Unique error code, a letter for the compiler stage and a number
    pub error_code: &'static str,

    /// Short description of the kind of error
    pub name: String,

    /// Locations and messages explaining the error
    pub labels: Vec<Label>,
}

/// A message attached to a diagnostic.  Labels without a span are shown as
/// notes after the source listing.
#[derive(Debug)]
pub struct Label {
    /// Bytes of the source the message refers to.  An empty span marks a
    /// single position.
    pub span: Option<Span>,

    pub message: String,
}

/// A byte range within a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// The file the range is in
    pub source: SourceId,

    /// Byte offset of the first character
    pub start: usize,

    /// Byte offset one past the last character
    pub end: usize,
}

impl Diagnostic {
    pub(crate) fn error(code: &'static str) -> Self {
        Diagnostic {
            error_code: code,
            name: String::new(),
            labels: vec![],
        }
    }

    pub(crate) fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    pub(crate) fn label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// The first label with a location
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find_map(|l| l.span)
    }
}

impl Label {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Label {
            span: None,
            message: message.into(),
        }
    }

    /// Attach the label to a location in the source
    pub(crate) fn at(self, span: Span) -> Self {
        Label {
            span: Some(span),
            ..self
        }
    }
}

impl Span {
    /// Create a span covering a byte range of a file
    pub fn new(source: SourceId, start: usize, end: usize) -> Self {
        Span { source, start, end }
    }

    /// Create a span from the start of this span to the end of another one.
    /// Both spans are expected to be in the same file.
    pub fn to(self, other: Span) -> Span {
        Span {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.error_code, self.name)?;

        for label in &self.labels {
            writeln!(f)?;
            match label.span {
                Some(span) => write!(
                    f,
                    "  --> {:?}@{}..{}: {}",
                    span.source, span.start, span.end, label.message
                )?,
                None => write!(f, "  = {}", label.message)?,
            }
        }

        Ok(())
    }
}

impl Error for Diagnostic {}
