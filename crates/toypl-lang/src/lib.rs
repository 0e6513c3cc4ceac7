pub mod syntax;
pub mod runtime;
pub mod error;
pub mod config;

pub use config::{Config, Output, EVAL_STACK_SIZE};
pub use error::{Error, ErrorCode, ErrorKind};
pub use syntax::ast::{Expr, Program};
pub use syntax::token::{Token, TokenKind};
pub use runtime::environment::Environment;
pub use runtime::interpreter::Interpreter;
pub use runtime::value::Value;

use tracing::{debug, instrument};

use syntax::parser::Parser;
use syntax::scanner::Scanner;

// ─── Public API ───────────────────────────────────────────────────────────────

/// Scan source text into tokens, ending with exactly one `Eof` token.
#[instrument(skip_all, fields(bytes = source.len()))]
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let tokens = Scanner::new(source).collect::<Result<Vec<_>, _>>()?;
    debug!(tokens = tokens.len(), "scanned");
    Ok(tokens)
}

/// Parse source text into a program tree.
#[instrument(skip_all, fields(bytes = source.len()))]
pub fn parse(source: &str) -> Result<Program, Error> {
    let program = Parser::from_source(source)?.parse()?;
    debug!(expressions = program.body.len(), "parsed");
    Ok(program)
}

/// Parse and evaluate source text in a fresh interpreter with default settings.
pub fn evaluate(source: &str) -> Result<Value, Error> {
    evaluate_with(source, Config::default())
}

/// Parse and evaluate source text in a fresh interpreter built from `config`.
pub fn evaluate_with(source: &str, config: Config) -> Result<Value, Error> {
    let program = parse(source)?;
    Interpreter::with_config(config).run(&program)
}
