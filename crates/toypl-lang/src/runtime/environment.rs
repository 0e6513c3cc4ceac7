//! Lexically nested scopes.
//!
//! An `Environment` is a shared handle: closures, class templates and
//! instances all keep the scope they reference alive for as long as they
//! exist. Cloning the handle never copies bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::runtime::value::Value;

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    /// Fixed at definition time.
    pub mutable: bool,
}

pub type Bindings = HashMap<String, Binding>;

struct Scope {
    bindings: Bindings,
    parent: Option<Environment>,
}

#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Self::with_bindings(Bindings::new(), None)
    }

    pub fn child(parent: &Environment) -> Self {
        Self::with_bindings(Bindings::new(), Some(parent))
    }

    pub fn with_bindings(bindings: Bindings, parent: Option<&Environment>) -> Self {
        Self(Rc::new(RefCell::new(Scope { bindings, parent: parent.cloned() })))
    }

    /// Insert or overwrite a binding in this scope's own mapping.
    pub fn define(&self, name: impl Into<String>, value: Value, mutable: bool) -> Value {
        self.0.borrow_mut().bindings.insert(name.into(), Binding { value: value.clone(), mutable });
        value
    }

    /// Overwrite the nearest binding of `name`, which must be mutable.
    pub fn assign(&self, name: &str, value: Value) -> Result<Value, Error> {
        let owner = self.resolve(name)?;
        let mut scope = owner.0.borrow_mut();
        let binding = scope.bindings.get_mut(name).ok_or_else(|| undefined(name))?;
        if !binding.mutable {
            return Err(Error::runtime(
                ErrorCode::R002,
                format!("cannot mutate the defined value `{name}`"),
            ));
        }
        binding.value = value.clone();
        Ok(value)
    }

    pub fn lookup(&self, name: &str) -> Result<Value, Error> {
        let owner = self.resolve(name)?;
        let scope = owner.0.borrow();
        scope.bindings.get(name).map(|b| b.value.clone()).ok_or_else(|| undefined(name))
    }

    /// The nearest scope, starting with this one, whose own mapping defines `name`.
    pub fn resolve(&self, name: &str) -> Result<Environment, Error> {
        let mut env = self.clone();
        loop {
            let parent = {
                let scope = env.0.borrow();
                if scope.bindings.contains_key(name) {
                    break;
                }
                scope.parent.clone()
            };
            env = parent.ok_or_else(|| undefined(name))?;
        }
        Ok(env)
    }

    /// A binding from this scope's own mapping only.
    pub fn get_own(&self, name: &str) -> Option<Binding> {
        self.0.borrow().bindings.get(name).cloned()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Shallow copy of the own mapping: values are cloned handles, so
    /// functions and objects stay shared.
    pub fn snapshot(&self) -> Bindings {
        self.0.borrow().bindings.clone()
    }

    /// Own binding names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().bindings.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new() }
}

// Instances bind `this` to themselves, so only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("has_parent", &self.0.borrow().parent.is_some())
            .finish()
    }
}

fn undefined(name: &str) -> Error {
    Error::runtime(ErrorCode::R001, format!("variable `{name}` is not defined"))
}
