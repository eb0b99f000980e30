//! Lexer (tokenizer) for C declaration text
//!
//! Converts one normalized line, or a multi-line aggregate span, into a flat
//! [`Token`] stream consumed by the recognizers. Only the tokens that can
//! appear in declarations get their own variant; any other punctuation is
//! passed through as [`Token::Other`] so that recognizers simply fail to match
//! instead of the whole line erroring out.

use std::fmt;

/// Source location information for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that recognizers can report
/// where a declaration stopped matching.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals (raw text, classified later)
    Number(String, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Preprocessor directive name, e.g. `define` for `#define`
    Directive(String, SourceLocation),

    // Keywords
    Typedef(SourceLocation),
    Struct(SourceLocation),
    Union(SourceLocation),
    Const(SourceLocation),
    Volatile(SourceLocation),

    // Punctuation
    Star(SourceLocation),      // *
    Pipe(SourceLocation),      // |
    Minus(SourceLocation),     // -
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,
    Ellipsis(SourceLocation),  // ...

    // Anything else
    Other(char, SourceLocation),

    // End of input
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Directive(_, loc)
            | Token::Typedef(loc)
            | Token::Struct(loc)
            | Token::Union(loc)
            | Token::Const(loc)
            | Token::Volatile(loc)
            | Token::Star(loc)
            | Token::Pipe(loc)
            | Token::Minus(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Ellipsis(loc)
            | Token::Other(_, loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Source spelling of the token, used to rebuild raw type text.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Number(s, _) | Token::Ident(s, _) => s.clone(),
            Token::StringLiteral(s, _) => format!("\"{}\"", s),
            Token::Directive(s, _) => format!("#{}", s),
            Token::Typedef(_) => "typedef".to_string(),
            Token::Struct(_) => "struct".to_string(),
            Token::Union(_) => "union".to_string(),
            Token::Const(_) => "const".to_string(),
            Token::Volatile(_) => "volatile".to_string(),
            Token::Star(_) => "*".to_string(),
            Token::Pipe(_) => "|".to_string(),
            Token::Minus(_) => "-".to_string(),
            Token::LParen(_) => "(".to_string(),
            Token::RParen(_) => ")".to_string(),
            Token::LBrace(_) => "{".to_string(),
            Token::RBrace(_) => "}".to_string(),
            Token::LBracket(_) => "[".to_string(),
            Token::RBracket(_) => "]".to_string(),
            Token::Semicolon(_) => ";".to_string(),
            Token::Comma(_) => ",".to_string(),
            Token::Ellipsis(_) => "...".to_string(),
            Token::Other(c, _) => c.to_string(),
            Token::Eof(_) => String::new(),
        }
    }

    /// Whether the token can be part of a type spelling or declarator name
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            Token::Ident(_, _)
                | Token::Struct(_)
                | Token::Union(_)
                | Token::Const(_)
                | Token::Volatile(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Directive(s, _) => write!(f, "directive '#{}'", s),
            Token::Eof(_) => write!(f, "end of line"),
            other => write!(f, "'{}'", other.lexeme()),
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for C declaration text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a lexer whose first line is reported as `first_line`.
    pub fn new(input: &str, first_line: usize) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: first_line,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        let token = match ch {
            '"' => self.string_literal(loc)?,
            '#' => self.directive(loc),
            '.' if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') => {
                self.advance();
                self.advance();
                Token::Ellipsis(loc)
            }
            '0'..='9' | '.' if ch != '.' || self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),
            '*' => Token::Star(loc),
            '|' => Token::Pipe(loc),
            '-' => Token::Minus(loc),
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),
            '[' => Token::LBracket(loc),
            ']' => Token::RBracket(loc),
            ';' => Token::Semicolon(loc),
            ',' => Token::Comma(loc),
            other => Token::Other(other, loc),
        };

        Ok(token)
    }

    /// Parse string literal; escapes are kept verbatim
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.advance() {
            match ch {
                '"' => return Ok(Token::StringLiteral(string, loc)),
                '\\' => {
                    string.push(ch);
                    if let Some(escaped) = self.advance() {
                        string.push(escaped);
                    }
                }
                '\n' => break,
                _ => string.push(ch),
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// `#` followed by a directive name; a bare `#` is passed through
    fn directive(&mut self, loc: SourceLocation) -> Token {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            Token::Other('#', loc)
        } else {
            Token::Directive(name, loc)
        }
    }

    /// Numeric literal: digits, hex digits, `.`, exponent and suffix letters
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Token {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '-' || ch == '+')
                && matches!(text.chars().last(), Some('e') | Some('E'))
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || exponent_sign {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(text, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "typedef" => Token::Typedef(loc),
            "struct" => Token::Struct(loc),
            "union" => Token::Union(loc),
            "const" => Token::Const(loc),
            "volatile" => Token::Volatile(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
