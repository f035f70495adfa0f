pub mod ast;
pub mod lexer;
pub mod parser;

use rill_common::error::{Error, ErrorS, SyntaxError};

use crate::ast::Program;
use crate::parser::Parser;

/// Scans and parses `source`. Lexical errors are all reported together; the
/// parser stops at its first error.
pub fn parse(source: &str) -> Result<Program, Vec<ErrorS>> {
    let (tokens, errors) = lexer::scan(source);
    if !errors.is_empty() {
        return Err(errors);
    }
    Parser::new(tokens).parse().map_err(|e| vec![e])
}

/// Returns `false` if `source` ended before the program did, i.e. more input
/// could still turn it into a valid program.
pub fn is_complete(source: &str) -> bool {
    match parse(source) {
        Ok(_) => true,
        Err(errors) => !errors.iter().any(|(e, _)| {
            matches!(
                e,
                Error::SyntaxError(
                    SyntaxError::UnrecognizedEof { .. } | SyntaxError::UnterminatedString
                )
            )
        }),
    }
}
