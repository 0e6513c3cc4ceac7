//! Bindings pre-installed in the global environment: `VERSION`, `print`, and
//! the arithmetic / comparison operators. All of them are immutable.

use std::rc::Rc;

use crate::config::{Config, Output};
use crate::error::{Error, ErrorCode};
use crate::runtime::environment::Environment;
use crate::runtime::value::{NativeFn, Value};

pub fn install(env: &Environment, config: &Config) {
    env.define("VERSION", Value::str(&config.version), false);
    native(env, print(config.output.clone()));

    native(env, binary("+", |a, b| Value::Number(a + b)));
    native(env, binary("*", |a, b| Value::Number(a * b)));
    native(env, binary("/", |a, b| Value::Number(a / b)));
    native(env, NativeFn::new("-", 1, |args| {
        let a = number("-", args, 0)?;
        if args.len() >= 2 {
            Ok(Value::Number(a - number("-", args, 1)?))
        } else {
            Ok(Value::Number(-a))
        }
    }));

    native(env, binary(">",  |a, b| Value::Bool(a > b)));
    native(env, binary("<",  |a, b| Value::Bool(a < b)));
    native(env, binary(">=", |a, b| Value::Bool(a >= b)));
    native(env, binary("<=", |a, b| Value::Bool(a <= b)));
    native(env, NativeFn::new("=", 2, |args| {
        let a = args.first().cloned().unwrap_or(Value::Undefined);
        let b = args.get(1).cloned().unwrap_or(Value::Undefined);
        Ok(Value::Bool(a == b))
    }));
}

fn native(env: &Environment, f: NativeFn) {
    let name = f.name.clone();
    env.define(name, Value::Native(Rc::new(f)), false);
}

fn print(output: Output) -> NativeFn {
    NativeFn::new("print", 0, move |args| {
        let line = args.iter().map(Value::to_string).collect::<Vec<_>>().join(" ");
        output.write_line(line)?;
        Ok(Value::Undefined)
    })
}

fn binary(name: &'static str, op: fn(f64, f64) -> Value) -> NativeFn {
    NativeFn::new(name, 2, move |args| {
        Ok(op(number(name, args, 0)?, number(name, args, 1)?))
    })
}

/// Argument `index` as a number.
fn number(name: &str, args: &[Value], index: usize) -> Result<f64, Error> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(Error::runtime(
            ErrorCode::R006,
            format!("`{name}` expects a number for argument {}, got {}", index + 1, other.type_name()),
        )),
        None => Err(Error::runtime(
            ErrorCode::R006,
            format!("`{name}` expects at least {} arguments, got {}", index + 1, args.len()),
        )),
    }
}
