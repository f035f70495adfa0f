mod array;
mod callable;
mod function;
mod native;
mod structure;

use std::fmt::{self, Display, Formatter};

pub use array::Array;
pub use callable::Callable;
pub use function::Function;
use gc::{Finalize, Trace};
pub use native::Native;
pub use structure::Struct;

#[derive(Clone, Debug, Finalize, Trace)]
pub enum Object {
    Array(Array),
    Bool(bool),
    Function(Function),
    Native(Native),
    Nil,
    Number(f64),
    String(String),
    Struct(Struct),
}

impl Object {
    /// Truthiness: only `nil` and `false` are falsy.
    pub fn bool(&self) -> bool {
        !matches!(self, Object::Nil | Object::Bool(false))
    }

    pub fn type_(&self) -> String {
        match self {
            Object::Array(_) => "array",
            Object::Bool(_) => "bool",
            Object::Function(_) | Object::Native(_) => "function",
            Object::Nil => "nil",
            Object::Number(_) => "number",
            Object::String(_) => "string",
            Object::Struct(_) => "struct",
        }
        .to_string()
    }

    /// The printed form of a value nested in an array or struct: like
    /// [`Display`], except that strings are quoted.
    pub fn repr(&self) -> String {
        Repr(self).to_string()
    }

    /// `seen` holds the containers currently being printed, so that a
    /// container which holds itself prints as `[...]` / `{...}`.
    fn fmt_nested(&self, f: &mut dyn fmt::Write, seen: &mut Vec<usize>, quote: bool) -> fmt::Result {
        match self {
            Object::Array(array) => {
                let id = array.id();
                if seen.contains(&id) {
                    return f.write_str("[...]");
                }
                seen.push(id);
                f.write_str("[")?;
                for (idx, element) in array.to_vec().iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    element.fmt_nested(f, seen, true)?;
                }
                seen.pop();
                f.write_str("]")
            }
            Object::Struct(struct_) => {
                let id = struct_.id();
                if seen.contains(&id) {
                    return f.write_str("{...}");
                }
                let fields = struct_.fields();
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                seen.push(id);
                f.write_str("{ ")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: ")?;
                    value.fmt_nested(f, seen, true)?;
                }
                seen.pop();
                f.write_str(" }")
            }
            Object::Bool(bool) => write!(f, "{bool}"),
            Object::Function(function) => write!(f, "{function}"),
            Object::Native(native) => write!(f, "{native}"),
            Object::Nil => f.write_str("nil"),
            Object::Number(number) => write!(f, "{number}"),
            Object::String(string) if quote => write!(f, "{string:?}"),
            Object::String(string) => f.write_str(string),
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, &mut Vec::new(), false)
    }
}

struct Repr<'a>(&'a Object);

impl Display for Repr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt_nested(f, &mut Vec::new(), true)
    }
}

/// Scalars compare by value; arrays, structs and functions by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Array(a1), Object::Array(a2)) => a1 == a2,
            (Object::Bool(b1), Object::Bool(b2)) => b1 == b2,
            (Object::Function(f1), Object::Function(f2)) => f1 == f2,
            (Object::Native(n1), Object::Native(n2)) => n1 == n2,
            (Object::Nil, Object::Nil) => true,
            (Object::Number(n1), Object::Number(n2)) => n1 == n2,
            (Object::String(s1), Object::String(s2)) => s1 == s2,
            (Object::Struct(s1), Object::Struct(s2)) => s1 == s2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn truthiness() {
        assert!(!Object::Nil.bool());
        assert!(!Object::Bool(false).bool());
        assert!(Object::Bool(true).bool());
        assert!(Object::Number(0.0).bool());
        assert!(Object::String(String::new()).bool());
        assert!(Array::default().into_object().bool());
    }

    #[test]
    fn display() {
        assert_eq!(Object::Number(3.0).to_string(), "3");
        assert_eq!(Object::Number(2.5).to_string(), "2.5");
        assert_eq!(Object::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Object::String("hi".to_string()).to_string(), "hi");
        assert_eq!(Object::Nil.to_string(), "nil");

        let array = Array::new(vec![
            Object::Number(1.0),
            Object::String("a".to_string()),
            Object::Nil,
        ]);
        assert_eq!(array.clone().into_object().to_string(), r#"[1, "a", nil]"#);

        let struct_ = Struct::default();
        assert_eq!(struct_.clone().into_object().to_string(), "{}");
        struct_.set("name", Object::String("x".to_string()));
        struct_.set("items", array.into_object());
        assert_eq!(
            struct_.into_object().to_string(),
            r#"{ name: "x", items: [1, "a", nil] }"#
        );
    }

    #[test]
    fn repr_quotes_strings() {
        assert_eq!(Object::String(r#"a"b"#.to_string()).repr(), r#""a\"b""#);
        assert_eq!(Object::Number(1.0).repr(), "1");
        let array = Array::new(vec![Object::String("x".to_string())]);
        assert_eq!(array.into_object().repr(), r#"["x"]"#);
    }

    #[test]
    fn display_cycle() {
        let array = Array::default();
        array.push(array.clone().into_object());
        assert_eq!(array.into_object().to_string(), "[[...]]");
    }

    #[test]
    fn equality() {
        assert_eq!(Object::Number(1.0), Object::Number(1.0));
        assert_ne!(Object::Number(1.0), Object::String("1".to_string()));
        assert_ne!(Object::Nil, Object::Bool(false));

        let a = Array::new(vec![Object::Number(1.0)]);
        let b = Array::new(vec![Object::Number(1.0)]);
        assert_eq!(a.clone().into_object(), a.clone().into_object());
        assert_ne!(a.into_object(), b.into_object());
    }
}
