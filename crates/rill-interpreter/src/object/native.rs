use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::time::Duration;

use gc::{Finalize, Trace};
use rill_common::error::{Error, ErrorS, IndexError, IoError, Result, TypeError};
use rill_common::types::Span;

use crate::interpreter::Interpreter;
use crate::object::{Array, Callable, Object};
use crate::system::{Clock, Console, Sleep, System};

/// The standard library. Every entry is defined as a global when an
/// interpreter is created.
#[remain::sorted]
#[derive(Clone, Debug, Eq, Finalize, PartialEq, Trace)]
pub enum Native {
    Abs,
    Boolean,
    Clear,
    Copy,
    IndexOf,
    Input,
    Insert,
    Int,
    Len,
    Now,
    Number,
    Output,
    Pop,
    Push,
    Remove,
    Shift,
    Sleep,
    Slice,
    String,
    Unshift,
}

impl Native {
    pub const ALL: [Native; 20] = [
        Native::Abs,
        Native::Boolean,
        Native::Clear,
        Native::Copy,
        Native::IndexOf,
        Native::Input,
        Native::Insert,
        Native::Int,
        Native::Len,
        Native::Now,
        Native::Number,
        Native::Output,
        Native::Pop,
        Native::Push,
        Native::Remove,
        Native::Shift,
        Native::Sleep,
        Native::Slice,
        Native::String,
        Native::Unshift,
    ];

    fn invalid(&self, message: &str, span: &Span) -> ErrorS {
        let error = TypeError::InvalidArgument {
            name: self.name().to_string(),
            message: message.to_string(),
        };
        (Error::TypeError(error), span.clone())
    }

    fn array(&self, object: &Object, span: &Span) -> Result<Array> {
        match object {
            Object::Array(array) => Ok(array.clone()),
            _ => Err(self.invalid(&format!("expected array, got {}", object.type_()), span)),
        }
    }

    fn number(&self, object: &Object, span: &Span) -> Result<f64> {
        match object {
            Object::Number(number) => Ok(*number),
            _ => Err(self.invalid(&format!("expected number, got {}", object.type_()), span)),
        }
    }

    /// An array position: a non-negative integer no greater than `max`.
    fn index(&self, object: &Object, max: usize, len: usize, span: &Span) -> Result<usize> {
        let number = self.number(object, span)?;
        if number < 0.0 || number.fract() != 0.0 {
            return Err(self.invalid(&format!("expected a non-negative integer index, got {number}"), span));
        }
        if number > max as f64 {
            let index = number as usize;
            return Err((
                Error::IndexError(IndexError::OutOfRange { type_: "array".to_string(), index, len }),
                span.clone(),
            ));
        }
        Ok(number as usize)
    }
}

impl Callable for Native {
    fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Native::Clear | Native::Now => 0..=0,
            Native::Input => 0..=1,
            Native::Abs
            | Native::Boolean
            | Native::Copy
            | Native::Int
            | Native::Len
            | Native::Number
            | Native::Output
            | Native::Pop
            | Native::Shift
            | Native::Sleep
            | Native::String => 1..=1,
            Native::IndexOf | Native::Push | Native::Remove | Native::Unshift => 2..=2,
            Native::Insert | Native::Slice => 3..=3,
        }
    }

    fn name(&self) -> &str {
        match self {
            Native::Abs => "abs",
            Native::Boolean => "boolean",
            Native::Clear => "clear",
            Native::Copy => "copy",
            Native::IndexOf => "indexOf",
            Native::Input => "input",
            Native::Insert => "insert",
            Native::Int => "int",
            Native::Len => "len",
            Native::Now => "now",
            Native::Number => "number",
            Native::Output => "output",
            Native::Pop => "pop",
            Native::Push => "push",
            Native::Remove => "remove",
            Native::Shift => "shift",
            Native::Sleep => "sleep",
            Native::Slice => "slice",
            Native::String => "string",
            Native::Unshift => "unshift",
        }
    }

    fn call_unchecked<S: System>(
        &self,
        interpreter: &mut Interpreter<S>,
        args: Vec<Object>,
        span: &Span,
    ) -> Result<Object> {
        let system = interpreter.system_mut();
        match self {
            Native::Abs => Ok(Object::Number(self.number(&args[0], span)?.abs())),
            Native::Boolean => Ok(Object::Bool(args[0].bool())),
            Native::Clear => clear(system, span),
            Native::Copy => self.copy(&args[0], span),
            Native::IndexOf => self.index_of(&args[0], &args[1], span),
            Native::Input => input(system, args.first(), span),
            Native::Insert => {
                let array = self.array(&args[0], span)?;
                let len = array.len();
                let idx = self.index(&args[1], len, len, span)?;
                array.insert(idx, args[2].clone());
                Ok(Object::Nil)
            }
            Native::Int => self.int(&args[0], span),
            Native::Len => match &args[0] {
                Object::Array(array) => Ok(Object::Number(array.len() as f64)),
                Object::String(string) => Ok(Object::Number(string.chars().count() as f64)),
                object => {
                    Err(self.invalid(&format!("expected array or string, got {}", object.type_()), span))
                }
            },
            Native::Now => Ok(now(&*system)),
            Native::Number => self.coerce_number(&args[0], span),
            Native::Output => output(system, &args[0], span),
            Native::Pop => Ok(self.array(&args[0], span)?.pop().unwrap_or(Object::Nil)),
            Native::Push => {
                let len = self.array(&args[0], span)?.push(args[1].clone());
                Ok(Object::Number(len as f64))
            }
            Native::Remove => {
                let array = self.array(&args[0], span)?;
                let len = array.len();
                if len == 0 {
                    let index = self.index(&args[1], usize::MAX, len, span)?;
                    let error = IndexError::OutOfRange { type_: "array".to_string(), index, len };
                    return Err((Error::IndexError(error), span.clone()));
                }
                let idx = self.index(&args[1], len - 1, len, span)?;
                Ok(array.remove(idx))
            }
            Native::Shift => {
                let array = self.array(&args[0], span)?;
                Ok(if array.is_empty() { Object::Nil } else { array.remove(0) })
            }
            Native::Sleep => {
                let millis = self.number(&args[0], span)?;
                if !(millis >= 0.0 && millis.is_finite()) {
                    return Err(self.invalid(&format!("expected a non-negative duration, got {millis}"), span));
                }
                let duration = Duration::try_from_secs_f64(millis / 1000.0)
                    .map_err(|_| self.invalid(&format!("duration of {millis:e}ms is too long"), span))?;
                sleep(system, duration);
                Ok(Object::Nil)
            }
            Native::Slice => self.slice(&args[0], &args[1], &args[2], span),
            Native::String => Ok(Object::String(args[0].to_string())),
            Native::Unshift => {
                let array = self.array(&args[0], span)?;
                array.insert(0, args[1].clone());
                Ok(Object::Number(array.len() as f64))
            }
        }
    }
}

impl Native {
    fn copy(&self, object: &Object, span: &Span) -> Result<Object> {
        match object {
            Object::Array(array) => Ok(Array::new(array.to_vec()).into_object()),
            Object::Struct(struct_) => Ok(struct_.shallow_copy().into_object()),
            _ => Err(self.invalid(&format!("expected array or struct, got {}", object.type_()), span)),
        }
    }

    fn index_of(&self, haystack: &Object, needle: &Object, span: &Span) -> Result<Object> {
        let idx = match (haystack, needle) {
            (Object::Array(array), _) => array.position(needle),
            (Object::String(string), Object::String(substring)) => {
                string.find(substring.as_str()).map(|byte| string[..byte].chars().count())
            }
            (Object::String(_), _) => {
                return Err(self.invalid(
                    &format!("expected string to search for, got {}", needle.type_()),
                    span,
                ));
            }
            _ => {
                return Err(self.invalid(
                    &format!("expected array or string, got {}", haystack.type_()),
                    span,
                ));
            }
        };
        Ok(Object::Number(idx.map_or(-1.0, |idx| idx as f64)))
    }

    /// Parses a leading integer out of a string, or truncates a number.
    fn int(&self, object: &Object, span: &Span) -> Result<Object> {
        match object {
            Object::Number(number) if number.is_finite() => Ok(Object::Number(number.trunc())),
            Object::Number(_) => Ok(Object::Number(f64::NAN)),
            Object::String(string) => Ok(Object::Number(parse_int(string))),
            _ => Err(self.invalid(&format!("expected string or number, got {}", object.type_()), span)),
        }
    }

    fn slice(&self, object: &Object, start: &Object, end: &Object, span: &Span) -> Result<Object> {
        let start = self.number(start, span)?;
        let end = self.number(end, span)?;
        // Both bounds are clamped to `0..=len`, and the end never precedes the start.
        let bounds = |len: usize| {
            let clamp = |bound: f64| if bound.is_nan() { 0 } else { bound.clamp(0.0, len as f64) as usize };
            let start = clamp(start);
            (start, clamp(end).max(start))
        };
        match object {
            Object::Array(array) => {
                let (start, end) = bounds(array.len());
                Ok(Array::new(array.to_vec()[start..end].to_vec()).into_object())
            }
            Object::String(string) => {
                let (start, end) = bounds(string.chars().count());
                Ok(Object::String(string.chars().skip(start).take(end - start).collect()))
            }
            _ => Err(self.invalid(&format!("expected array or string, got {}", object.type_()), span)),
        }
    }

    fn coerce_number(&self, object: &Object, span: &Span) -> Result<Object> {
        match object {
            Object::Bool(bool) => Ok(Object::Number(if *bool { 1.0 } else { 0.0 })),
            Object::Number(number) => Ok(Object::Number(*number)),
            Object::String(string) => Ok(Object::Number(parse_number(string))),
            _ => Err(self.invalid(&format!("expected string, number or bool, got {}", object.type_()), span)),
        }
    }
}

fn clear(console: &mut impl Console, span: &Span) -> Result<Object> {
    console.clear().map_err(|_| write_error(span))?;
    Ok(Object::Nil)
}

fn input(console: &mut impl Console, prompt: Option<&Object>, span: &Span) -> Result<Object> {
    if let Some(prompt) = prompt {
        console.write_line(&prompt.to_string()).map_err(|_| write_error(span))?;
    }
    let line = console.read_line().map_err(|_| {
        (Error::IoError(IoError::ReadError { file: "stdin".to_string() }), span.clone())
    })?;
    Ok(line.map_or(Object::Nil, Object::String))
}

fn output(console: &mut impl Console, value: &Object, span: &Span) -> Result<Object> {
    console.write_line(&value.to_string()).map_err(|_| write_error(span))?;
    Ok(Object::Nil)
}

fn now(clock: &impl Clock) -> Object {
    Object::Number(clock.now().as_millis() as f64)
}

fn sleep(sleeper: &mut impl Sleep, duration: Duration) {
    sleeper.sleep(duration);
}

fn write_error(span: &Span) -> ErrorS {
    (Error::IoError(IoError::WriteError { file: "stdout".to_string() }), span.clone())
}

/// Leading optionally-signed integer, ignoring leading whitespace. `NaN` if
/// there are no digits.
fn parse_int(string: &str) -> f64 {
    let string = string.trim_start();
    let (sign, digits) = match string.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, string.strip_prefix('+').unwrap_or(string)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    match digits[..end].parse::<f64>() {
        Ok(number) if end > 0 => sign * number,
        _ => f64::NAN,
    }
}

/// Decimal notation only; blank input is zero.
fn parse_number(string: &str) -> f64 {
    let string = string.trim();
    if string.is_empty() {
        return 0.0;
    }
    let is_decimal = string
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    match string.parse::<f64>() {
        Ok(number) if is_decimal => number,
        _ => f64::NAN,
    }
}

impl Display for Native {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<native {}>", self.name())
    }
}
