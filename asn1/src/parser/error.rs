use std::fmt::Display;

use crate::{
    compiler::SourceId,
    diagnostic::{Diagnostic, Label, Span},
    lexer::LexerError,
    token::TokenKind,
    util::CowVec,
};

/// Any error that can be emitted by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Expected one of the token kinds at a given offset into a file, `got`
    /// is `None` at the end of the input
    Expected {
        kind: CowVec<TokenKind>,
        got: Option<TokenKind>,
        offset: usize,
        id: SourceId,
    },

    /// Expected the end of a braced group, but more tokens were found
    UnexpectedToken {
        got: TokenKind,
        offset: usize,
        id: SourceId,
    },

    /// Recursion depth limit reached in the parser (try to avoid stack overflow)
    ParserDepthExceeded { offset: usize, id: SourceId },

    /// An error occurred within the lexer
    LexerError(LexerError),

    /// A number literal that does not fit in 64 bits
    NumberTooLarge { offset: usize, id: SourceId },

    /// Valid ASN.1 that this compiler does not handle
    Unsupported {
        feature: &'static str,
        offset: usize,
        id: SourceId,
    },
}

pub type Result<T = (), E = ParserError> = std::result::Result<T, E>;

impl From<LexerError> for ParserError {
    fn from(value: LexerError) -> Self {
        ParserError::LexerError(value)
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::Expected { kind, got, .. } => {
                match &kind[..] {
                    [] => write!(f, "unexpected ")?,
                    [one] => write!(f, "expected {one:?}, found ")?,
                    many => write!(f, "expected one of {many:?}, found ")?,
                }
                match got {
                    Some(got) => write!(f, "{got:?}"),
                    None => write!(f, "end of input"),
                }
            }
            ParserError::UnexpectedToken { got, .. } => {
                write!(f, "unexpected {got:?}, expected end of input")
            }
            ParserError::ParserDepthExceeded { .. } => write!(f, "input is nested too deeply"),
            ParserError::LexerError(err) => match err {
                LexerError::Unrecognised { .. } => write!(f, "unrecognised character"),
                LexerError::NonTerminatedComment { .. } => write!(f, "comment is never closed"),
                LexerError::NonTerminatedString { .. } => write!(f, "string is never closed"),
                LexerError::InvalidNumber { .. } => write!(f, "invalid number"),
            },
            ParserError::NumberTooLarge { .. } => write!(f, "number is too large"),
            ParserError::Unsupported { feature, .. } => write!(f, "{feature} are not supported"),
        }
    }
}

impl std::error::Error for ParserError {}

impl ParserError {
    /// Location the error was found at
    pub fn location(&self) -> (SourceId, usize) {
        match *self {
            ParserError::Expected { offset, id, .. }
            | ParserError::UnexpectedToken { offset, id, .. }
            | ParserError::ParserDepthExceeded { offset, id }
            | ParserError::NumberTooLarge { offset, id }
            | ParserError::Unsupported { offset, id, .. } => (id, offset),
            ParserError::LexerError(
                LexerError::Unrecognised { offset, id }
                | LexerError::NonTerminatedComment { offset, id }
                | LexerError::NonTerminatedString { offset, id }
                | LexerError::InvalidNumber { offset, id },
            ) => (id, offset),
        }
    }

    /// Unique error code for the error
    fn code(&self) -> &'static str {
        match self {
            ParserError::LexerError(LexerError::Unrecognised { .. }) => "L001",
            ParserError::LexerError(LexerError::NonTerminatedComment { .. }) => "L002",
            ParserError::LexerError(LexerError::NonTerminatedString { .. }) => "L003",
            ParserError::LexerError(LexerError::InvalidNumber { .. }) => "L004",
            ParserError::Expected { .. } => "P001",
            ParserError::UnexpectedToken { .. } => "P002",
            ParserError::ParserDepthExceeded { .. } => "P003",
            ParserError::NumberTooLarge { .. } => "P004",
            ParserError::Unsupported { .. } => "P005",
        }
    }
}

impl From<ParserError> for Diagnostic {
    fn from(value: ParserError) -> Self {
        let (id, offset) = value.location();
        let name = match value {
            ParserError::LexerError(_) => "Lexer error",
            ParserError::Unsupported { .. } => "Unsupported syntax",
            _ => "Syntax error",
        };

        Diagnostic::error(value.code())
            .name(name)
            .label(Label::new(value.to_string()).at(Span::new(id, offset, offset)))
    }
}
