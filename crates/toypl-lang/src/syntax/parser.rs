use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::*;
use crate::syntax::scanner::Scanner;
use crate::syntax::token::{Token, TokenKind};

/// Recursive-descent parser with a single token of lookahead.
///
/// Tokens are pulled lazily, so a scanner error surfaces as soon as the parser
/// reaches the offending character.
pub struct Parser<I> {
    tokens: I,
    lookahead: Token,
}

impl<'a> Parser<Scanner<'a>> {
    pub fn from_source(source: &'a str) -> Result<Self, Error> {
        Self::new(Scanner::new(source))
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    pub fn new(mut tokens: I) -> Result<Self, Error> {
        let lookahead = tokens.next().transpose()?.unwrap_or_else(|| Token::eof(1));
        Ok(Self { tokens, lookahead })
    }

    pub fn parse(mut self) -> Result<Program, Error> {
        let body = self.parse_expression_list(None)?;
        Ok(Program { body })
    }

    // ─── Lists ───────────────────────────────────────────────────────────────

    /// One or more expressions, up to end of input or `stop`.
    fn parse_expression_list(&mut self, stop: Option<TokenKind>) -> Result<Vec<Expr>, Error> {
        let mut list = vec![self.parse_expression()?];
        while !self.check(TokenKind::Eof) && Some(self.lookahead.kind) != stop {
            list.push(self.parse_expression()?);
        }
        Ok(list)
    }

    /// Zero or more expressions between `open` and `close`.
    fn parse_delimited(&mut self, open: TokenKind, close: TokenKind) -> Result<Vec<Expr>, Error> {
        self.eat(open)?;
        let body = if self.check(close) {
            Vec::new()
        } else {
            self.parse_expression_list(Some(close))?
        };
        self.eat(close)?;
        Ok(body)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, Error> {
        self.parse_delimited(TokenKind::LeftParen, TokenKind::RightParen)
    }

    fn parse_params(&mut self) -> Result<Vec<String>, Error> {
        self.eat(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RightParen) {
            params.push(self.parse_identifier_name()?);
        }
        self.eat(TokenKind::RightParen)?;
        Ok(params)
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn parse_expression(&mut self) -> Result<Expr, Error> {
        match self.lookahead.kind {
            TokenKind::Number     => self.parse_number(),
            TokenKind::String     => self.parse_string(),
            TokenKind::True       => { self.eat(TokenKind::True)?; Ok(Expr::Bool { value: true }) }
            TokenKind::False      => { self.eat(TokenKind::False)?; Ok(Expr::Bool { value: false }) }
            TokenKind::Null       => { self.eat(TokenKind::Null)?; Ok(Expr::Null) }
            TokenKind::Def        => self.parse_definition(),
            TokenKind::Set        => self.parse_set(),
            TokenKind::If         => self.parse_if(),
            TokenKind::While      => self.parse_while(),
            TokenKind::Do         => self.parse_do_while(),
            TokenKind::Lambda     => self.parse_function(),
            TokenKind::LeftBrace  => self.parse_block(),
            TokenKind::Class      => self.parse_class(),
            TokenKind::New        => self.parse_new(),
            TokenKind::Identifier => self.parse_identifier_expression(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, Error> {
        let tok = self.eat(TokenKind::Number)?;
        let text = tok.describe();
        let value = text.parse::<f64>().map_err(|_| {
            Error::syntax(ErrorCode::P001, tok.line, format!("invalid number literal `{text}`"))
        })?;
        Ok(Expr::Number { value })
    }

    fn parse_string(&mut self) -> Result<Expr, Error> {
        let tok = self.eat(TokenKind::String)?;
        let raw = tok.describe();
        // the scanner guarantees matching quote characters at both ends
        let value = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default().to_string();
        Ok(Expr::Str { value })
    }

    fn parse_definition(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::Def)?;
        let mutable = self.matches(TokenKind::Mut)?;
        let target = self.parse_identifier_expression()?;
        let value = self.parse_expression()?;
        Ok(Expr::Definition { target: Box::new(target), value: Box::new(value), mutable })
    }

    fn parse_set(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::Set)?;
        let target = self.parse_identifier_expression()?;
        let value = self.parse_expression()?;
        Ok(Expr::Set { target: Box::new(target), value: Box::new(value) })
    }

    fn parse_block(&mut self) -> Result<Expr, Error> {
        let body = self.parse_delimited(TokenKind::LeftBrace, TokenKind::RightBrace)?;
        Ok(Expr::Block { body })
    }

    fn parse_if(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::If)?;
        let test = self.parse_expression()?;
        self.eat(TokenKind::Then)?;
        let consequent = self.parse_expression()?;
        self.eat(TokenKind::Else)?;
        let alternate = self.parse_expression()?;
        Ok(Expr::If {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_while(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::While)?;
        let test = self.parse_expression()?;
        let body = self.parse_expression()?;
        Ok(Expr::While { test: Box::new(test), body: Box::new(body) })
    }

    fn parse_do_while(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::Do)?;
        let body = self.parse_expression()?;
        self.eat(TokenKind::While)?;
        let test = self.parse_expression()?;
        Ok(Expr::DoWhile { body: Box::new(body), test: Box::new(test) })
    }

    fn parse_function(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::Lambda)?;
        let params = self.parse_params()?;
        let body = self.parse_expression()?;
        Ok(Expr::Function(Rc::new(Lambda { params, body })))
    }

    fn parse_class(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::Class)?;
        self.eat(TokenKind::LeftBrace)?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let name = self.parse_identifier_name()?;
            let params = self.parse_params()?;
            let body = self.parse_expression()?;
            methods.push(Method { name, lambda: Rc::new(Lambda { params, body }) });
        }
        self.eat(TokenKind::RightBrace)?;
        Ok(Expr::Class { methods })
    }

    fn parse_new(&mut self) -> Result<Expr, Error> {
        self.eat(TokenKind::New)?;
        let class = self.parse_identifier_name()?;
        let args = self.parse_arguments()?;
        Ok(Expr::New { class, args })
    }

    /// A bare identifier, a call chain `f(..)(..)`, or a member chain `a.b`, `a[k]`.
    fn parse_identifier_expression(&mut self) -> Result<Expr, Error> {
        let id = Expr::ident(self.parse_identifier_name()?);
        match self.lookahead.kind {
            TokenKind::LeftParen => self.parse_call(id),
            TokenKind::Dot | TokenKind::LeftBracket => self.parse_member(id),
            _ => Ok(id),
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, Error> {
        let mut call = Expr::Call { callee: Box::new(callee), args: self.parse_arguments()? };
        while self.check(TokenKind::LeftParen) {
            call = Expr::Call { callee: Box::new(call), args: self.parse_arguments()? };
        }
        Ok(call)
    }

    /// Each new access wraps the chain built so far. The `.` message is a full
    /// expression, so `a.b.c` nests to the right through that recursion.
    fn parse_member(&mut self, object: Expr) -> Result<Expr, Error> {
        let mut expr = object;
        loop {
            if self.matches(TokenKind::Dot)? {
                let property = self.parse_expression()?;
                expr = Expr::Member { object: Box::new(expr), property: Box::new(property), computed: false };
            } else if self.matches(TokenKind::LeftBracket)? {
                let property = self.parse_expression()?;
                self.eat(TokenKind::RightBracket)?;
                expr = Expr::Member { object: Box::new(expr), property: Box::new(property), computed: true };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_identifier_name(&mut self) -> Result<String, Error> {
        let tok = self.eat(TokenKind::Identifier)?;
        Ok(tok.literal.unwrap_or_default())
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn check(&self, kind: TokenKind) -> bool {
        self.lookahead.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> Result<bool, Error> {
        if self.check(kind) {
            self.eat(kind)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the lookahead if it is `expected`, returning it.
    fn eat(&mut self, expected: TokenKind) -> Result<Token, Error> {
        if !self.check(expected) {
            return Err(self.unexpected(&format!("`{expected}`")));
        }
        let next = match self.tokens.next().transpose()? {
            Some(tok) => tok,
            None => Token::eof(self.lookahead.line),
        };
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = &self.lookahead;
        if tok.kind == TokenKind::Eof {
            Error::syntax(
                ErrorCode::P002,
                tok.line,
                format!("unexpected end of input, expected {expected}"),
            )
        } else {
            Error::syntax(
                ErrorCode::P001,
                tok.line,
                format!("unexpected token `{}`, expected {expected}", tok.describe()),
            )
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
