use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Eof,
    Eol,

    // Punctuation
    Semicolon,    // ;
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    Comma,        // ,
    Dot,          // .
    LeftBracket,  // [
    RightBracket, // ]

    // Keywords
    True,
    False,
    Null,
    Def,
    Mut,
    Set,
    If,
    Then,
    Else,
    While,
    Do,
    Lambda,
    Class,
    New,

    // Literals
    Number,
    Identifier,
    String,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eof          => "EOF",
            Self::Eol          => "EOL",
            Self::Semicolon    => ";",
            Self::LeftBrace    => "{",
            Self::RightBrace   => "}",
            Self::LeftParen    => "(",
            Self::RightParen   => ")",
            Self::Comma        => ",",
            Self::Dot          => ".",
            Self::LeftBracket  => "[",
            Self::RightBracket => "]",
            Self::True         => "true",
            Self::False        => "false",
            Self::Null         => "null",
            Self::Def          => "def",
            Self::Mut          => "mut",
            Self::Set          => "set",
            Self::If           => "if",
            Self::Then         => "then",
            Self::Else         => "else",
            Self::While        => "while",
            Self::Do           => "do",
            Self::Lambda       => "lambda",
            Self::Class        => "class",
            Self::New          => "new",
            Self::Number       => "NUMBER",
            Self::Identifier   => "IDENTIFIER",
            Self::String       => "STRING",
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::True | Self::False | Self::Null | Self::Def | Self::Mut | Self::Set
            | Self::If | Self::Then | Self::Else | Self::While | Self::Do
            | Self::Lambda | Self::Class | Self::New
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Number | Self::String | Self::True | Self::False | Self::Null)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// One scanned token. `literal` is the raw matched text, absent only for `Eof`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize) -> Self {
        Self { kind, literal: Some(literal.into()), line }
    }

    pub fn eof(line: usize) -> Self {
        Self { kind: TokenKind::Eof, literal: None, line }
    }

    /// Literal text for error messages; `Eof` renders as `end of input`.
    pub fn describe(&self) -> &str {
        self.literal.as_deref().unwrap_or("end of input")
    }
}
