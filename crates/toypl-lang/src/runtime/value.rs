use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::runtime::environment::Environment;
use crate::syntax::ast::Lambda;

/// Host implementation behind a native callable.
pub type NativeImpl = dyn Fn(&[Value]) -> Result<Value, Error>;

pub struct NativeFn {
    pub name: String,
    /// Fewer arguments is an error; extra arguments are ignored.
    pub min_args: usize,
    pub func: Box<NativeImpl>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        min_args: usize,
        func: impl Fn(&[Value]) -> Result<Value, Error> + 'static,
    ) -> Self {
        Self { name: name.into(), min_args, func: Box::new(func) }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).field("min_args", &self.min_args).finish()
    }
}

/// A user function: a lambda plus the environment it was created in.
///
/// Methods (`is_method`) ignore `env` at call time and use the call-site
/// environment as the activation parent instead.
#[derive(Debug)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Environment,
    pub is_method: bool,
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Value {
    /// Result of an empty block, a loop that never ran, or a missing argument.
    Undefined,
    Null,
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    Native(Rc<NativeFn>),
    Function(Rc<Closure>),
    /// Class templates and instances are both plain environments.
    Object(Environment),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// `false`, `null`, `undefined`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Native(_) | Value::Function(_) | Value::Object(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined   => "undefined",
            Value::Null        => "null",
            Value::Number(_)   => "number",
            Value::Str(_)      => "string",
            Value::Bool(_)     => "boolean",
            Value::Native(_)   => "native function",
            Value::Function(f) => if f.is_method { "method" } else { "function" },
            Value::Object(_)   => "object",
        }
    }

    pub fn as_object(&self) -> Option<&Environment> {
        match self {
            Value::Object(env) => Some(env),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }
}

/// Primitives compare by value; functions and objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null)           => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b))       => a == b,
            (Value::Bool(a), Value::Bool(b))     => a == b,
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Number(n) => fmt_number(*n, f),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Native(n) => write!(f, "<native fn {}>", n.name),
            Value::Function(c) => {
                let kind = if c.is_method { "method" } else { "lambda" };
                write!(f, "<{kind}({})>", c.lambda.params.join(" "))
            }
            Value::Object(env) => write!(f, "<object {{{}}}>", env.names().join(" ")),
        }
    }
}

/// Integral numbers print without a fractional part: `3`, not `3.0`.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == n.trunc() && n.abs() < 1e21 {
        write!(f, "{}", n as i128)
    } else {
        write!(f, "{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::str("").is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::str("0").is_truthy());
        assert!(Value::Object(Environment::new()).is_truthy());
    }

    #[test]
    fn number_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-2.0).to_string(), "-2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn equality_is_by_value_for_primitives() {
        assert_eq!(Value::str("a"), Value::str("a"));
        assert_ne!(Value::Number(1.0), Value::str("1"));
        assert_ne!(Value::Null, Value::Undefined);
    }

    #[test]
    fn equality_is_by_identity_for_objects() {
        let a = Environment::new();
        let b = Environment::new();
        assert_eq!(Value::Object(a.clone()), Value::Object(a));
        assert_ne!(Value::Object(b), Value::Object(Environment::new()));
    }
}
