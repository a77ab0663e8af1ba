//! Error types reported by the parser.
use crate::source::Span;
use crate::tokens::{Delim, Token};
use std::error::Error;
use std::fmt;

/// Describes an error that occurred in parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    /// What went wrong, including the offending token where there is one.
    pub kind: ErrorKind,

    /// The span in the source the error occurred in.
    pub span: Span,
}

/// The different ways parsing can fail.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// Grouping was invoked on an empty token sequence.
    EmptySource,

    /// A lone delimiter with no structural role.
    UnexpectedToken(Token),

    /// A token run that matches no recognized shape.
    Malformed,

    /// An opening delimiter with no matching closer in its enclosing scope.
    UnbalancedDelimiter(Delim),

    /// A closing delimiter with no corresponding pending opener.
    UnmatchedCloser(Delim),

    /// Nesting exceeds the configured safety bound.
    TooDeep(usize),
}

impl ParseError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.span.start.line, self.span.start.column, self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::EmptySource => write!(f, "empty source"),
            ErrorKind::UnexpectedToken(token) => write!(f, "unexpected token: {}", token),
            ErrorKind::Malformed => write!(f, "malformed expression"),
            ErrorKind::UnbalancedDelimiter(delim) => match delim.closing() {
                Some(closer) => write!(f, "unbalanced '{}': no matching '{}'", delim, closer),
                None => write!(f, "unbalanced '{}'", delim),
            },
            ErrorKind::UnmatchedCloser(delim) => {
                write!(f, "unmatched '{}' with no corresponding opener", delim)
            }
            ErrorKind::TooDeep(limit) => {
                write!(f, "nesting exceeds maximum depth of {}", limit)
            }
        }
    }
}

impl Error for ParseError {}
