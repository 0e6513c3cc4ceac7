//! Tree-walking interpreter. Evaluates an expression against an environment
//! by recursing on the tree's shape.
//!
//! There is no recursion-depth guard and no loop bound: a runaway loop runs
//! forever and runaway recursion exhausts the native stack. Hosts that run
//! deeply recursive programs do so on a thread of `EVAL_STACK_SIZE` bytes.

use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::config::{Config, Output};
use crate::error::{Error, ErrorCode};
use crate::runtime::builtins;
use crate::runtime::environment::{Bindings, Environment, Binding};
use crate::runtime::value::{Closure, NativeFn, Value};
use crate::syntax::ast::{Expr, Lambda, Method, Program};

pub struct Interpreter {
    global: Environment,
    output: Output,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let global = Environment::new();
        builtins::install(&global, &config);
        Self { global, output: config.output }
    }

    /// The root scope. Top-level definitions from `run` land here.
    pub fn global(&self) -> &Environment {
        &self.global
    }

    /// Lines printed so far when the config captures output.
    pub fn take_output(&self) -> Vec<String> {
        self.output.take()
    }

    // ─── Entry points ─────────────────────────────────────────────────────────

    /// Evaluate every top-level expression in the global environment and
    /// return the last value.
    #[instrument(skip_all, fields(expressions = program.body.len()))]
    pub fn run(&self, program: &Program) -> Result<Value, Error> {
        let mut result = Value::Undefined;
        for expr in &program.body {
            result = self.eval(expr, &self.global)?;
        }
        debug!(result = %result, "program finished");
        Ok(result)
    }

    /// Keep the arms thin: every language-level call nests several `eval` frames.
    pub fn eval(&self, expr: &Expr, env: &Environment) -> Result<Value, Error> {
        match expr {
            Expr::Number { value } => Ok(Value::Number(*value)),
            Expr::Str { value }    => Ok(Value::str(value)),
            Expr::Bool { value }   => Ok(Value::Bool(*value)),
            Expr::Null             => Ok(Value::Null),

            Expr::Identifier { name } => env.lookup(name),

            Expr::Definition { target, value, mutable } => self.eval_definition(target, value, *mutable, env),
            Expr::Set { target, value } => self.eval_set(target, value, env),
            Expr::Block { body } => self.eval_sequence(body, &Environment::child(env)),
            Expr::If { test, consequent, alternate } => self.eval_if(test, consequent, alternate, env),
            Expr::While { test, body } => self.eval_while(test, body, env),
            Expr::DoWhile { body, test } => self.eval_do_while(body, test, env),
            Expr::Function(lambda) => Ok(closure(lambda, env)),
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
            Expr::Member { object, property, computed } => self.eval_member(object, property, *computed, env),
            Expr::Class { methods } => Ok(Value::Object(self.eval_class(methods, env))),
            Expr::New { class, args } => self.eval_new(class, args, env),
        }
    }

    fn eval_sequence(&self, body: &[Expr], env: &Environment) -> Result<Value, Error> {
        let mut result = Value::Undefined;
        for expr in body {
            result = self.eval(expr, env)?;
        }
        Ok(result)
    }

    fn eval_definition(&self, target: &Expr, value: &Expr, mutable: bool, env: &Environment) -> Result<Value, Error> {
        let (name, owner) = self.resolve_target(target, env)?;
        let value = self.eval(value, env)?;
        Ok(owner.define(name, value, mutable))
    }

    fn eval_set(&self, target: &Expr, value: &Expr, env: &Environment) -> Result<Value, Error> {
        let (name, owner) = self.resolve_target(target, env)?;
        let value = self.eval(value, env)?;
        owner.assign(&name, value)
    }

    fn eval_if(&self, test: &Expr, consequent: &Expr, alternate: &Expr, env: &Environment) -> Result<Value, Error> {
        let branch = if self.eval(test, env)?.is_truthy() { consequent } else { alternate };
        self.eval(branch, env)
    }

    fn eval_while(&self, test: &Expr, body: &Expr, env: &Environment) -> Result<Value, Error> {
        let mut result = Value::Undefined;
        while self.eval(test, env)?.is_truthy() {
            result = self.eval(body, env)?;
        }
        Ok(result)
    }

    fn eval_do_while(&self, body: &Expr, test: &Expr, env: &Environment) -> Result<Value, Error> {
        let mut result = self.eval(body, env)?;
        while self.eval(test, env)?.is_truthy() {
            result = self.eval(body, env)?;
        }
        Ok(result)
    }

    fn eval_member(&self, object: &Expr, property: &Expr, computed: bool, env: &Environment) -> Result<Value, Error> {
        let receiver = self.eval_receiver(object, env)?;
        if computed {
            let key = self.eval_key(property, env)?;
            receiver.lookup(&key)
        } else {
            self.eval(property, &receiver)
        }
    }

    // ─── Definition / assignment targets ──────────────────────────────────────

    /// The binding name and the scope that owns it for `def` / `set`.
    ///
    /// A bare identifier belongs to `env`. A member path walks receivers until
    /// its last segment, so `def this.x 1` lands on the instance.
    fn resolve_target(&self, target: &Expr, env: &Environment) -> Result<(String, Environment), Error> {
        match target {
            Expr::Identifier { name } => Ok((name.clone(), env.clone())),
            Expr::Member { object, property, computed } => {
                let receiver = self.eval_receiver(object, env)?;
                if *computed {
                    Ok((self.eval_key(property, env)?, receiver))
                } else {
                    self.resolve_target(property, &receiver)
                }
            }
            other => Err(Error::runtime(
                ErrorCode::R003,
                format!("def and set on {} are not supported", other.node_name()),
            )),
        }
    }

    fn eval_receiver(&self, object: &Expr, env: &Environment) -> Result<Environment, Error> {
        match self.eval(object, env)? {
            Value::Object(receiver) => Ok(receiver),
            other => Err(Error::runtime(
                ErrorCode::R005,
                format!("cannot access a member of {} value `{other}`", other.type_name()),
            )),
        }
    }

    /// The name addressed by a computed `[key]`, evaluated in the caller's scope.
    fn eval_key(&self, key: &Expr, env: &Environment) -> Result<String, Error> {
        match self.eval(key, env)? {
            Value::Str(s) => Ok(s.to_string()),
            n @ Value::Number(_) => Ok(n.to_string()),
            other => Err(Error::runtime(
                ErrorCode::R005,
                format!("member key must be a string or number, got {}", other.type_name()),
            )),
        }
    }

    // ─── Calls ────────────────────────────────────────────────────────────────

    fn eval_call(&self, callee: &Expr, args: &[Expr], env: &Environment) -> Result<Value, Error> {
        let func = self.eval(callee, env)?;
        let arg_vals = args.iter().map(|a| self.eval(a, env)).collect::<Result<Vec<_>, _>>()?;

        match func {
            Value::Native(native) => call_native(&native, &arg_vals),
            Value::Function(closure) => {
                // methods see the call site (the instance); closures see their definition site
                let parent = if closure.is_method { env } else { &closure.env };
                trace!(method = closure.is_method, args = arg_vals.len(), "call closure");
                self.apply(&closure.lambda, arg_vals, parent)
            }
            other => Err(Error::runtime(
                ErrorCode::R004,
                format!("{} `{other}` is not callable", other.type_name()),
            )),
        }
    }

    /// Bind parameters in a fresh activation scope under `parent` and run the body.
    fn apply(&self, lambda: &Lambda, args: Vec<Value>, parent: &Environment) -> Result<Value, Error> {
        let activation = Environment::with_bindings(activation_record(&lambda.params, args), Some(parent));
        self.eval(&lambda.body, &activation)
    }

    // ─── Classes ──────────────────────────────────────────────────────────────

    fn eval_class(&self, methods: &[Method], env: &Environment) -> Environment {
        let class_env = Environment::child(env);
        for method in methods {
            let closure = Closure {
                lambda: Rc::clone(&method.lambda),
                env: class_env.clone(),
                is_method: true,
            };
            class_env.define(method.name.clone(), Value::Function(Rc::new(closure)), false);
        }
        class_env
    }

    fn eval_new(&self, class: &str, args: &[Expr], env: &Environment) -> Result<Value, Error> {
        let class_env = match env.lookup(class)? {
            Value::Object(class_env) => class_env,
            other => return Err(Error::runtime(
                ErrorCode::R005,
                format!("cannot instantiate `{class}`: {} is not a class", other.type_name()),
            )),
        };

        let instance = Environment::with_bindings(class_env.snapshot(), Some(env));
        instance.define("this", Value::Object(instance.clone()), false);
        let arg_vals = args.iter().map(|a| self.eval(a, env)).collect::<Result<Vec<_>, _>>()?;
        trace!(class, args = arg_vals.len(), "new instance");

        if let Some(Binding { value: init, .. }) = instance.get_own("init") {
            match init {
                Value::Function(closure) => {
                    self.apply(&closure.lambda, arg_vals, &instance)?;
                }
                Value::Native(native) => {
                    call_native(&native, &arg_vals)?;
                }
                other => return Err(Error::runtime(
                    ErrorCode::R004,
                    format!("`init` of `{class}` is {} and not callable", other.type_name()),
                )),
            }
        }

        Ok(Value::Object(instance))
    }
}

impl Default for Interpreter {
    fn default() -> Self { Self::new() }
}

fn closure(lambda: &Rc<Lambda>, env: &Environment) -> Value {
    Value::Function(Rc::new(Closure { lambda: Rc::clone(lambda), env: env.clone(), is_method: false }))
}

fn call_native(native: &NativeFn, args: &[Value]) -> Result<Value, Error> {
    trace!(name = %native.name, args = args.len(), "call native");
    let min = native.min_args;
    if args.len() < min {
        return Err(Error::runtime(
            ErrorCode::R006,
            format!("`{}` expects at least {min} arguments, got {}", native.name, args.len()),
        ));
    }
    (native.func)(args)
}

/// Parameters bound immutably, in order. Missing arguments are `undefined`,
/// extra ones are dropped.
fn activation_record(params: &[String], args: Vec<Value>) -> Bindings {
    let mut args = args.into_iter();
    params
        .iter()
        .map(|p| {
            let value = args.next().unwrap_or(Value::Undefined);
            (p.clone(), Binding { value, mutable: false })
        })
        .collect()
}
