//! Recognizer cursor
//!
//! This module provides the [`LineParser`] struct and its token helpers.
//! Each declaration shape is recognized by a method implemented in a sibling
//! module (`declarations`, `aggregates`) through its own `impl LineParser`
//! block, so every recognizer shares the same cursor state.
//!
//! A recognizer returns `Err(ParseError)` when its shape does not match. At
//! the scanner level that is a non-match, not a failure: the line is simply
//! skipped.

use crate::parser::lexer::{LexError, Lexer, SourceLocation, Token};
use std::fmt;

/// Why a line did not match a recognizer
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No match at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent cursor over one declaration's tokens
pub struct LineParser {
    pub(crate) source: Vec<char>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl LineParser {
    /// Tokenize `source`, reporting its first line as `line`.
    pub fn new(source: &str, line: usize) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source, line);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            source: source.chars().collect(),
            tokens,
            position: 0,
        })
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn mismatch<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            message: format!("{}, found {}", message.into(), self.peek()),
            location: self.current_location(),
        })
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            self.mismatch(message)
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_end(&mut self, ctx: &str) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            self.mismatch(format!("Expected end of declaration {ctx}"))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            self.mismatch("Expected identifier")
        }
    }

    /// Source text from the current token to the end of its line
    pub(crate) fn rest_of_line(&self) -> String {
        let loc = self.current_location();
        let first_line = self.tokens[0].location().line;
        self.source
            .split(|&c| c == '\n')
            .nth(loc.line - first_line)
            .map(|line| line.iter().skip(loc.column - 1).collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Collect tokens up to (not including) a top-level `stop` token.
    ///
    /// Parentheses, brackets and braces are tracked so that a `,` inside a
    /// nested parameter list does not end the group.
    pub(crate) fn collect_until(&mut self, stops: &[Token]) -> Vec<Token> {
        let mut depth = 0usize;
        let mut group = Vec::new();
        loop {
            let at_stop = stops
                .iter()
                .any(|stop| std::mem::discriminant(self.peek()) == std::mem::discriminant(stop));
            if self.is_at_end() || (depth == 0 && at_stop) {
                break;
            }
            match self.peek() {
                Token::LParen(_) | Token::LBracket(_) | Token::LBrace(_) => depth += 1,
                Token::RParen(_) | Token::RBracket(_) | Token::RBrace(_) => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            group.push(self.advance().clone());
        }
        group
    }
}

/// Join token lexemes into raw declaration text
pub(crate) fn spell(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::lexeme)
        .collect::<Vec<_>>()
        .join(" ")
}
