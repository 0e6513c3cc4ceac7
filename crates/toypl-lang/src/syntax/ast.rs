use std::rc::Rc;

use serde::Serialize;

// ─── Top level ───────────────────────────────────────────────────────────────

/// A whole source file: one or more expressions, evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Expr>,
}

// ─── Functions ───────────────────────────────────────────────────────────────

/// Parameter names and body shared by lambdas and class methods.
///
/// Held behind an `Rc` so closures created at runtime keep the body alive
/// after the tree that produced them is dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Expr,
}

/// `name(params) body` inside a `class { }` literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub lambda: Rc<Lambda>,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Number { value: f64 },
    /// Quotes already stripped.
    Str { value: String },
    Bool { value: bool },
    Null,
    Identifier { name: String },

    /// `def [mut] target value`
    Definition {
        target: Box<Expr>,
        value: Box<Expr>,
        mutable: bool,
    },

    /// `set target value`
    Set {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// `{ expr* }`
    Block { body: Vec<Expr> },

    /// `if test then consequent else alternate`
    If {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    /// `while test body`
    While {
        test: Box<Expr>,
        body: Box<Expr>,
    },

    /// `do body while test`
    DoWhile {
        body: Box<Expr>,
        test: Box<Expr>,
    },

    /// `lambda (params) body`
    Function(Rc<Lambda>),

    /// `callee(args)`; `f(x)(y)` nests the outer call around the inner one.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `object.property` or `object[property]` (`computed`).
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },

    /// `class { method* }`
    Class { methods: Vec<Method> },

    /// `new Name(args)`
    New {
        class: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    /// Short node name for error messages.
    pub fn node_name(&self) -> &'static str {
        match self {
            Expr::Number { .. }     => "NumericLiteral",
            Expr::Str { .. }        => "StringLiteral",
            Expr::Bool { .. }       => "BooleanLiteral",
            Expr::Null              => "NullLiteral",
            Expr::Identifier { .. } => "Identifier",
            Expr::Definition { .. } => "DefinitionExpression",
            Expr::Set { .. }        => "SetExpression",
            Expr::Block { .. }      => "BlockExpression",
            Expr::If { .. }         => "IfExpression",
            Expr::While { .. }      => "WhileExpression",
            Expr::DoWhile { .. }    => "DoWhileExpression",
            Expr::Function(_)       => "FunctionExpression",
            Expr::Call { .. }       => "CallExpression",
            Expr::Member { .. }     => "CallMemberExpression",
            Expr::Class { .. }      => "ClassExpression",
            Expr::New { .. }        => "NewExpression",
        }
    }
}
