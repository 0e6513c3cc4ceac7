mod logging;
mod version;

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use toypl_lang::{Config, ErrorKind, Interpreter, EVAL_STACK_SIZE};
use tracing::debug;

// sysexits.h
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_NOINPUT: u8 = 66;
const EX_SOFTWARE: u8 = 70;

#[derive(Parser)]
#[command(name = "toypl", version, about = "Scanner, parser and interpreter for the toypl language")]
struct Cli {
    /// Log at debug level unless TOYPL_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream of a source string as JSON
    ScanString { source: String },
    /// Print the token stream of a source file as JSON
    ScanFile { path: PathBuf },
    /// Print the syntax tree of a source string as JSON
    ParseString { source: String },
    /// Print the syntax tree of a source file as JSON
    ParseFile { path: PathBuf },
    /// Evaluate a source string and print the result
    EvalString { source: String },
    /// Evaluate a source file and print the result
    EvalFile { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(command: Option<Command>) -> Result<ExitCode> {
    match command {
        Some(Command::ScanString { source }) => print_json(&toypl_lang::tokenize(&source)?)?,
        Some(Command::ScanFile { path }) => print_json(&toypl_lang::tokenize(&read_source(&path)?)?)?,
        Some(Command::ParseString { source }) => print_json(&toypl_lang::parse(&source)?)?,
        Some(Command::ParseFile { path }) => print_json(&toypl_lang::parse(&read_source(&path)?)?)?,
        Some(Command::EvalString { source }) => eval(source)?,
        Some(Command::EvalFile { path }) => eval(read_source(&path)?)?,
        None if !io::stdin().is_terminal() => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).context("failed to read stdin")?;
            eval(source)?;
        }
        None => {
            Cli::command().print_help()?;
            return Ok(ExitCode::from(EX_USAGE));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(io::stdout().lock(), "{json}").context("failed to write to stdout")?;
    Ok(())
}

/// Runs the program on its own thread so deep recursion gets `EVAL_STACK_SIZE`
/// bytes of stack instead of the main thread's default.
fn eval(source: String) -> Result<()> {
    let version = version::resolve();
    let worker = thread::Builder::new()
        .name("toypl-eval".into())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || -> Result<Option<String>, toypl_lang::Error> {
            let program = toypl_lang::parse(&source)?;
            let interp = Interpreter::with_config(Config::default().with_version(version));
            let result = interp.run(&program)?;
            debug!(result = %result, "evaluated");
            Ok((!result.is_undefined()).then(|| result.to_string()))
        })
        .context("failed to start the evaluation thread")?;

    let shown = worker.join().map_err(|_| anyhow!("evaluation thread panicked"))??;
    if let Some(text) = shown {
        writeln!(io::stdout().lock(), "{text}").context("failed to write to stdout")?;
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<toypl_lang::Error>() {
        match e.kind() {
            ErrorKind::Lexical | ErrorKind::Syntax => EX_DATAERR,
            ErrorKind::Runtime => EX_SOFTWARE,
        }
    } else if err.downcast_ref::<io::Error>().is_some() {
        EX_NOINPUT
    } else {
        EX_SOFTWARE
    }
}
