use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::{Error, ErrorCode};

/// Native stack for a thread that evaluates programs. Each language-level
/// call costs a few kilobytes, so this covers tens of thousands of frames.
pub const EVAL_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Where `print` writes its lines.
#[derive(Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    /// Lines are buffered; read them back with `Interpreter::take_output`.
    Capture(Rc<RefCell<Vec<String>>>),
    /// Any host sink, e.g. a file or a socket.
    Writer(Rc<RefCell<Box<dyn Write>>>),
}

impl Output {
    pub fn capture() -> Self {
        Output::Capture(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn writer(w: impl Write + 'static) -> Self {
        Output::Writer(Rc::new(RefCell::new(Box::new(w))))
    }

    /// A failed write (closed pipe, full disk) surfaces as R007.
    pub fn write_line(&self, line: String) -> Result<(), Error> {
        let written = match self {
            Output::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Output::Capture(buf) => {
                buf.borrow_mut().push(line);
                Ok(())
            }
            Output::Writer(w) => {
                let mut w = w.borrow_mut();
                writeln!(w, "{line}")
            }
        };
        written.map_err(|e| Error::runtime(ErrorCode::R007, format!("cannot write output: {e}")))
    }

    /// Drain captured lines. Always empty for the other sinks.
    pub fn take(&self) -> Vec<String> {
        match self {
            Output::Capture(buf) => buf.borrow_mut().drain(..).collect(),
            Output::Stdout | Output::Writer(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("Stdout"),
            Output::Capture(buf) => f.debug_tuple("Capture").field(&buf.borrow().len()).finish(),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

/// Interpreter construction settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bound immutably as `VERSION` in the global environment.
    pub version: String,
    pub output: Output,
}

impl Config {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn capture_output(mut self) -> Self {
        self.output = Output::capture();
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: concat!("v", env!("CARGO_PKG_VERSION")).to_string(),
            output: Output::Stdout,
        }
    }
}
