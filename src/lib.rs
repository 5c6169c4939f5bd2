//! Compiler from tiny Python to Jasmin assembly for the JVM.

use lalrpop_util::{ParseError, lalrpop_mod};

pub mod ast;
pub mod backend;
pub mod error;
pub mod frontend;
pub mod lexer;

lalrpop_mod!(
    #[allow(clippy::all, unused)]
    pub tpy
);

use ast::Program;
use error::{CompileError, line_col};
use lexer::{Lexer, Tok};

pub const DEFAULT_CLASS_NAME: &str = "Test";

/// Settings for one compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name of the generated class; calls between user functions are
    /// qualified with it
    pub class_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

pub fn parse(source: &str) -> Result<Program, CompileError> {
    tpy::ProgramParser::new()
        .parse(Lexer::new(source))
        .map_err(|err| syntax_error(source, err))
}

/// Parses, validates and translates `source`, returning the assembly text
pub fn compile(source: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let program = parse(source)?;
    frontend::translate_to_jasmin(&program, &options.class_name)
}

fn syntax_error(source: &str, err: ParseError<usize, Tok<'_>, CompileError>) -> CompileError {
    let (offset, message) = match err {
        ParseError::User { error } => return error,
        ParseError::InvalidToken { location } => (location, "invalid token".to_string()),
        ParseError::UnrecognizedEof { location, expected } => (
            location,
            format!("unexpected end of input, expected {}", expected.join(" or ")),
        ),
        ParseError::UnrecognizedToken {
            token: (start, tok, _),
            expected,
        } => (
            start,
            format!("unexpected {}, expected {}", tok, expected.join(" or ")),
        ),
        ParseError::ExtraToken {
            token: (start, tok, _),
        } => (start, format!("unexpected {}", tok)),
    };
    let (line, column) = line_col(source, offset);
    CompileError::Syntax {
        message,
        line,
        column,
    }
}
