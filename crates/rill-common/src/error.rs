use crate::types::{Span, Spanned};

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use termcolor::WriteColor;
use thiserror::Error;

use std::io;

pub type Result<T, E = ErrorS> = std::result::Result<T, E>;
pub type ErrorS = Spanned<Error>;

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("AttributeError: {0}")]
    AttributeError(AttributeError),
    #[error("IndexError: {0}")]
    IndexError(IndexError),
    #[error("IOError: {0}")]
    IoError(IoError),
    #[error("NameError: {0}")]
    NameError(NameError),
    #[error("OverflowError: {0}")]
    OverflowError(OverflowError),
    #[error("SyntaxError: {0}")]
    SyntaxError(SyntaxError),
    #[error("TypeError: {0}")]
    TypeError(TypeError),
    #[error("ZeroDivisionError: {0}")]
    ZeroDivisionError(ZeroDivisionError),
}

/// The phase in which an error was raised.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Lexical,
    Parse,
    Runtime,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SyntaxError(
                SyntaxError::UnexpectedInput { .. } | SyntaxError::UnterminatedString,
            ) => ErrorKind::Lexical,
            Error::SyntaxError(_) => ErrorKind::Parse,
            Error::AttributeError(_)
            | Error::IndexError(_)
            | Error::IoError(_)
            | Error::NameError(_)
            | Error::OverflowError(_)
            | Error::TypeError(_)
            | Error::ZeroDivisionError(_) => ErrorKind::Runtime,
        }
    }

    /// The error category, and the message without the category prefix.
    fn parts(&self) -> (&'static str, String) {
        match self {
            Error::AttributeError(e) => ("AttributeError", e.to_string()),
            Error::IndexError(e) => ("IndexError", e.to_string()),
            Error::IoError(e) => ("IOError", e.to_string()),
            Error::NameError(e) => ("NameError", e.to_string()),
            Error::OverflowError(e) => ("OverflowError", e.to_string()),
            Error::SyntaxError(e) => ("SyntaxError", e.to_string()),
            Error::TypeError(e) => ("TypeError", e.to_string()),
            Error::ZeroDivisionError(e) => ("ZeroDivisionError", e.to_string()),
        }
    }

    pub fn as_diagnostic(&self, span: &Span) -> Diagnostic<()> {
        let (code, message) = self.parts();
        let mut diagnostic = Diagnostic::error()
            .with_code(code)
            .with_message(message)
            .with_labels(vec![Label::primary((), span.range())]);
        if let Error::SyntaxError(
            SyntaxError::UnrecognizedEof { expected } | SyntaxError::UnrecognizedToken { expected, .. },
        ) = self
        {
            diagnostic = diagnostic.with_notes(vec![format!("expected: {}", one_of(expected))]);
        }
        diagnostic
    }
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AttributeError {
    #[error("{type_:?} object has no field {name:?}")]
    NoSuchAttribute { type_: String, name: String },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum IndexError {
    #[error("{type_} index {index} out of range for length {len}")]
    OutOfRange { type_: String, index: usize, len: usize },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum IoError {
    #[error("unable to read from {file}")]
    ReadError { file: String },
    #[error("unable to write to {file}")]
    WriteError { file: String },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum NameError {
    #[error("name {name:?} is not defined")]
    NotDefined { name: String },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum OverflowError {
    #[error("maximum call depth of {max} exceeded")]
    StackOverflow { max: usize },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SyntaxError {
    #[error(r#""break" outside loop"#)]
    BreakOutsideLoop,
    #[error(r#"multiple "default" clauses in switch"#)]
    DuplicateDefault,
    #[error("Structs cannot have multiple properties with the same name: {name:?}")]
    DuplicateField { name: String },
    #[error("Expect 'case' or 'default' inside switch body.")]
    EmptySwitch,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error(r#""return" outside function"#)]
    ReturnOutsideFunction,
    #[error("cannot nest more than {max} levels deep")]
    TooDeeplyNested { max: usize },
    #[error("cannot have more than {max} arguments")]
    TooManyArguments { max: usize },
    #[error("cannot have more than {max} parameters")]
    TooManyParameters { max: usize },
    #[error("unexpected input {token:?}")]
    UnexpectedInput { token: String },
    #[error("unexpected end of file")]
    UnrecognizedEof { expected: Vec<String> },
    #[error("unexpected {token:?}")]
    UnrecognizedToken { token: String, expected: Vec<String> },
    #[error("unterminated string")]
    UnterminatedString,
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TypeError {
    #[error("{name}() takes {} arguments but {got_args} were given", arity(.min_args, .max_args))]
    ArityMismatch { name: String, min_args: usize, max_args: usize, got_args: usize },
    #[error("{name}() {message}")]
    InvalidArgument { name: String, message: String },
    #[error("{type_} indices must be non-negative integers, not {index}")]
    InvalidIndex { type_: String, index: String },
    #[error("{type_:?} object is not callable")]
    NotCallable { type_: String },
    #[error("{type_:?} object does not support {access}")]
    NotIndexable { type_: String, access: String },
    #[error("{keyword:?} can only be used inside a method")]
    ReservedKeyword { keyword: String },
    #[error("unsupported operand type(s) for {op}: {lt_type:?} and {rt_type:?}")]
    UnsupportedOperandInfix { op: String, lt_type: String, rt_type: String },
    #[error("unsupported operand type for {op}: {rt_type:?}")]
    UnsupportedOperandPrefix { op: String, rt_type: String },
}

#[remain::sorted]
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ZeroDivisionError {
    #[error("division by zero")]
    DivisionByZero,
}

fn arity(min_args: &usize, max_args: &usize) -> String {
    if min_args == max_args {
        min_args.to_string()
    } else {
        format!("{min_args} to {max_args}")
    }
}

fn one_of(tokens: &[String]) -> String {
    let (token_last, tokens) = match tokens.split_last() {
        Some((token_last, &[])) => return token_last.to_string(),
        Some((token_last, tokens)) => (token_last, tokens),
        None => return "nothing".to_string(),
    };

    let mut output = String::new();
    for token in tokens {
        output.push_str(token);
        output.push_str(", ");
    }
    output.push_str("or ");
    output.push_str(token_last);
    output
}

/// Renders `errors` against `source`, in source order.
pub fn report_errors(
    writer: &mut dyn WriteColor,
    name: &str,
    source: &str,
    errors: &[ErrorS],
) -> io::Result<()> {
    let mut errors = errors.iter().collect::<Vec<_>>();
    errors.sort_unstable_by_key(|(_, span)| (span.start, span.end));

    let file = SimpleFile::new(name, source);
    let config = term::Config::default();
    for (error, span) in errors {
        let diagnostic = error.as_diagnostic(span);
        term::emit(writer, &config, &file, &diagnostic).map_err(|e| match e {
            codespan_reporting::files::Error::Io(e) => e,
            e => io::Error::new(io::ErrorKind::Other, e.to_string()),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use termcolor::NoColor;

    #[test]
    fn arity_message() {
        let exact = TypeError::ArityMismatch {
            name: "add".to_string(),
            min_args: 2,
            max_args: 2,
            got_args: 1,
        };
        assert_eq!(exact.to_string(), "add() takes 2 arguments but 1 were given");

        let range = TypeError::ArityMismatch {
            name: "input".to_string(),
            min_args: 0,
            max_args: 1,
            got_args: 3,
        };
        assert_eq!(range.to_string(), "input() takes 0 to 1 arguments but 3 were given");
    }

    #[test]
    fn error_kind() {
        let lexical = Error::SyntaxError(SyntaxError::UnterminatedString);
        let parse = Error::SyntaxError(SyntaxError::InvalidAssignmentTarget);
        let runtime = Error::ZeroDivisionError(ZeroDivisionError::DivisionByZero);
        assert_eq!(lexical.kind(), ErrorKind::Lexical);
        assert_eq!(parse.kind(), ErrorKind::Parse);
        assert_eq!(runtime.kind(), ErrorKind::Runtime);

        let nesting = Error::SyntaxError(SyntaxError::TooDeeplyNested { max: 128 });
        let overflow = Error::OverflowError(OverflowError::StackOverflow { max: 64 });
        assert_eq!(nesting.kind(), ErrorKind::Parse);
        assert_eq!(overflow.kind(), ErrorKind::Runtime);
        assert_eq!(overflow.to_string(), "OverflowError: maximum call depth of 64 exceeded");
    }

    #[test]
    fn expected_note() {
        assert_eq!(one_of(&[]), "nothing");
        assert_eq!(one_of(&["\";\"".to_string()]), "\";\"");
        assert_eq!(one_of(&["a".to_string(), "b".to_string(), "c".to_string()]), "a, b, or c");
    }

    #[test]
    fn report() {
        let source = "var x = ;\n";
        let errors = vec![(
            Error::SyntaxError(SyntaxError::UnrecognizedToken {
                token: ";".to_string(),
                expected: vec!["expression".to_string()],
            }),
            Span::new(1, 8, 9),
        )];
        let mut output = NoColor::new(Vec::new());
        report_errors(&mut output, "<script>", source, &errors).unwrap();
        let output = String::from_utf8(output.into_inner()).unwrap();
        assert!(output.contains("error[SyntaxError]: unexpected \";\""));
        assert!(output.contains("expected: expression"));
    }
}
