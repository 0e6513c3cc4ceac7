use tracing::trace;

use crate::error::Error;
use crate::syntax::token::{Token, TokenKind};

// ─── Lexical rules ───────────────────────────────────────────────────────────

/// A prefix matcher. Every pattern consumes at least one byte when it matches.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    Newline,
    Whitespace,
    LineComment(&'static str),
    BlockComment,
    Char(u8),
    /// Keyword that must end on a word boundary.
    Keyword(&'static str),
    /// Literal text with no boundary check (the `λ` glyph).
    Glyph(&'static str),
    Digits,
    Word,
    /// A lone `/` that does not open a comment.
    Slash,
    Quoted(char),
}

struct Rule {
    pattern: Pattern,
    /// `None` discards the match.
    kind: Option<TokenKind>,
}

const fn rule(pattern: Pattern, kind: TokenKind) -> Rule {
    Rule { pattern, kind: Some(kind) }
}

const fn skip(pattern: Pattern) -> Rule {
    Rule { pattern, kind: None }
}

/// Tried in order; the first rule matching a prefix of the remaining input wins.
const RULES: &[Rule] = &[
    rule(Pattern::Newline, TokenKind::Eol),
    skip(Pattern::Whitespace),

    skip(Pattern::LineComment("#")),
    skip(Pattern::LineComment("//")),
    skip(Pattern::BlockComment),

    rule(Pattern::Char(b';'), TokenKind::Semicolon),
    rule(Pattern::Char(b'{'), TokenKind::LeftBrace),
    rule(Pattern::Char(b'}'), TokenKind::RightBrace),
    rule(Pattern::Char(b'('), TokenKind::LeftParen),
    rule(Pattern::Char(b')'), TokenKind::RightParen),
    rule(Pattern::Char(b','), TokenKind::Comma),
    rule(Pattern::Char(b'.'), TokenKind::Dot),
    rule(Pattern::Char(b'['), TokenKind::LeftBracket),
    rule(Pattern::Char(b']'), TokenKind::RightBracket),

    rule(Pattern::Keyword("true"), TokenKind::True),
    rule(Pattern::Keyword("false"), TokenKind::False),
    rule(Pattern::Keyword("null"), TokenKind::Null),
    rule(Pattern::Keyword("def"), TokenKind::Def),
    rule(Pattern::Keyword("mut"), TokenKind::Mut),
    rule(Pattern::Keyword("set"), TokenKind::Set),
    rule(Pattern::Keyword("if"), TokenKind::If),
    rule(Pattern::Keyword("then"), TokenKind::Then),
    rule(Pattern::Keyword("else"), TokenKind::Else),
    rule(Pattern::Keyword("while"), TokenKind::While),
    rule(Pattern::Keyword("do"), TokenKind::Do),
    rule(Pattern::Glyph("λ"), TokenKind::Lambda),
    rule(Pattern::Keyword("lambda"), TokenKind::Lambda),
    rule(Pattern::Keyword("class"), TokenKind::Class),
    rule(Pattern::Keyword("new"), TokenKind::New),

    rule(Pattern::Digits, TokenKind::Number),
    rule(Pattern::Word, TokenKind::Identifier),
    rule(Pattern::Slash, TokenKind::Identifier),

    rule(Pattern::Quoted('"'), TokenKind::String),
    rule(Pattern::Quoted('\''), TokenKind::String),
];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier_byte(b: u8) -> bool {
    is_word_byte(b) || matches!(b, b'-' | b'+' | b'*' | b'=' | b'<' | b'>')
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl Pattern {
    /// Byte length of the matched prefix of `rest`, if any.
    fn match_len(self, rest: &str) -> Option<usize> {
        let bytes = rest.as_bytes();
        let len = match self {
            Pattern::Newline => usize::from(rest.starts_with('\n')),
            Pattern::Whitespace => rest
                .chars()
                .take_while(|c| c.is_whitespace() && *c != '\n')
                .map(char::len_utf8)
                .sum(),
            Pattern::LineComment(prefix) => {
                if !rest.starts_with(prefix) { return None; }
                rest.find(is_line_terminator).unwrap_or(rest.len())
            }
            Pattern::BlockComment => {
                if !rest.starts_with("/*") { return None; }
                rest[2..].find("*/").map(|i| i + 4)?
            }
            Pattern::Char(c) => usize::from(bytes.first() == Some(&c)),
            Pattern::Keyword(kw) => {
                let boundary = bytes.get(kw.len()).is_none_or(|b| !is_word_byte(*b));
                if rest.starts_with(kw) && boundary { kw.len() } else { 0 }
            }
            Pattern::Glyph(glyph) => if rest.starts_with(glyph) { glyph.len() } else { 0 },
            Pattern::Digits => bytes.iter().take_while(|b| b.is_ascii_digit()).count(),
            Pattern::Word => bytes.iter().take_while(|b| is_identifier_byte(**b)).count(),
            Pattern::Slash => {
                let opens_comment = matches!(bytes.get(1), Some(b'/' | b'*'));
                usize::from(bytes.first() == Some(&b'/') && !opens_comment)
            }
            Pattern::Quoted(quote) => {
                if !rest.starts_with(quote) { return None; }
                rest[1..].find(quote).map(|i| i + 2)?
            }
        };
        (len > 0).then_some(len)
    }
}

// ─── Scanner ─────────────────────────────────────────────────────────────────

/// Produces tokens on demand from source text. Not restartable: once the end
/// of input is reached every further call returns `Eof`.
pub struct Scanner<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, cursor: 0, line: 1, done: false }
    }

    /// Current 1-based line of the cursor.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn has_more_tokens(&self) -> bool {
        self.cursor < self.source.len()
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            if !self.has_more_tokens() {
                return Ok(Token::eof(self.line));
            }

            let rest = &self.source[self.cursor..];
            let Some((kind, len)) = RULES
                .iter()
                .find_map(|r| r.pattern.match_len(rest).map(|len| (r.kind, len)))
            else {
                let ch = rest.chars().next().unwrap_or_default();
                return Err(Error::lex(self.line, format!("unexpected character `{ch}`")));
            };

            let text = &rest[..len];
            let line = self.line;
            self.cursor += len;
            // newlines inside block comments and strings still count
            self.line += text.matches('\n').count();

            match kind {
                None | Some(TokenKind::Eol) => continue,
                Some(kind) => {
                    trace!(%kind, text, line, "token");
                    return Ok(Token::new(kind, text, line));
                }
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, Error>;

    /// Yields every token including a single trailing `Eof`, then `None`.
    /// Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        if matches!(result, Ok(Token { kind: TokenKind::Eof, .. }) | Err(_)) {
            self.done = true;
        }
        Some(result)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
