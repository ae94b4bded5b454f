//! Error types for expression parsing and evaluation.

use thiserror::Error;

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors raised while tokenizing, parsing or evaluating an expression.
///
/// Positions are byte offsets into the expression text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Invalid number '{text}' at {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("Expected {expected}, found {found} at {pos}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
    },

    #[error("Unknown identifier '{name}' at {pos}")]
    UnknownIdentifier { name: String, pos: usize },

    #[error("Unknown function '{name}' at {pos}")]
    UnknownFunction { name: String, pos: usize },

    #[error("Function '{name}' takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Expression nests deeper than {limit} levels at {pos}")]
    TooDeep { limit: usize, pos: usize },

    #[error("Expression is empty")]
    Empty,

    #[error("Expression evaluated to non-finite value {value} at x = {x}")]
    NonFinite { value: f64, x: f64 },
}
