//! Error types for every compilation phase.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while splitting source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {line}:{column}")]
    UnexpectedChar { ch: char, line: usize, column: usize },

    #[error("unterminated string literal at {line}:{column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("unindent does not match any outer indentation level at line {line}")]
    InconsistentDedent { line: usize },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("integer literal {literal} does not fit in 32 bits")]
    IntegerOutOfRange { literal: String },

    #[error("unsupported comparison operator '{op}'")]
    UnsupportedOperator { op: String },

    #[error("variable '{name}' is used before it is assigned")]
    UndeclaredVariable { name: String },

    #[error("malformed syntax tree: {message}")]
    MalformedTree { message: String },

    #[error("'break' outside of a loop")]
    BreakOutsideLoop,

    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,

    #[error("'return' with a value outside of a function")]
    ReturnValueOutsideFunction,

    #[error("function '{name}' is defined more than once")]
    DuplicateFunction { name: String },

    #[error("parameter '{param}' is repeated in function '{function}'")]
    DuplicateParameter { function: String, param: String },

    #[error("call to undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("function '{name}' takes {expected} argument(s) but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{function}' needs more than {limit} local variable slots")]
    TooManyLocals { function: String, limit: u16 },

    #[error("'{function}' needs an operand stack deeper than {limit}")]
    StackTooDeep { function: String, limit: u16 },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Converts a byte offset into a 1-based (line, column) pair.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
