use thiserror::Error;

/// Error codes prefixed by phase: L = scanner, P = parser, R = runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Scanner
    L001, // unexpected character

    // Parser
    P001, // unexpected token
    P002, // unexpected end of input

    // Runtime
    R001, // undefined variable
    R002, // assignment to immutable binding
    R003, // invalid definition / assignment target
    R004, // value is not callable
    R005, // value is not an object
    R006, // native argument missing or of the wrong type
    R007, // output could not be written
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
            Self::R004 => "R004",
            Self::R005 => "R005",
            Self::R006 => "R006",
            Self::R007 => "R007",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::L001 => ErrorKind::Lexical,
            Self::P001 | Self::P002 => ErrorKind::Syntax,
            _ => ErrorKind::Runtime,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three failure categories. Each one aborts the whole
/// tokenize / parse / evaluate call that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Runtime,
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("[{code}] line {line}: {message}")]
    Lex { code: ErrorCode, line: usize, message: String },

    #[error("[{code}] line {line}: {message}")]
    Syntax { code: ErrorCode, line: usize, message: String },

    #[error("[{code}] {message}")]
    Runtime { code: ErrorCode, message: String },
}

impl Error {
    pub fn lex(line: usize, message: impl Into<String>) -> Self {
        Self::Lex { code: ErrorCode::L001, line, message: message.into() }
    }

    pub fn syntax(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self::Syntax { code, line, message: message.into() }
    }

    pub fn runtime(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Runtime { code, message: message.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex { code, .. } | Self::Syntax { code, .. } | Self::Runtime { code, .. } => *code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }

    /// Source line for scanner and parser errors. Runtime errors carry none.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lex { line, .. } | Self::Syntax { line, .. } => Some(*line),
            Self::Runtime { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Syntax { message, .. } | Self::Runtime { message, .. } => message,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
