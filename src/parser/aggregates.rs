//! Struct body recognition
//!
//! Struct bodies are the only declarations that span several lines. They
//! are found in two steps: [`collect_spans`] groups consecutive normalized
//! lines from the `struct` keyword to the brace that closes it, then
//! [`LineParser::parse_aggregate`] recognizes the reassembled text.
//! A typedef alias that differs from the tag is reported alongside it.
//!
//! # Grammar
//!
//! ```text
//! aggregate  ::= ["typedef"] "struct" [identifier] "{" member* "}" [identifier] ";"
//! member     ::= type declarator ("," declarator)* ";"
//! declarator ::= "*"* identifier array* | "(" "*" identifier ")" "(" ... ")"
//! ```
//!
//! Members that contain a nested body (`struct { int a; } inner;`) are
//! skipped; only the enclosing struct is recorded.

use crate::errors::ScanError;
use crate::parser::declarations::{split_declarator, RawDeclarator};
use crate::parser::lexer::Token;
use crate::parser::normalize::SourceLine;
use crate::parser::parse::{spell, LineParser, ParseError};
use std::ops::Range;

/// Consecutive normalized lines holding one struct body
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpan {
    /// Original line number of the `struct` line
    pub start_line: usize,
    /// Indices into the normalized line list
    pub lines: Range<usize>,
    pub text: String,
}

/// Group struct bodies, tracking brace depth across lines.
pub fn collect_spans(lines: &[SourceLine]) -> Result<Vec<AggregateSpan>, ScanError> {
    let mut spans = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let next = lines.get(index + 1).map(|l| l.text.as_str());
        if !opens_aggregate(&lines[index].text, next) {
            index += 1;
            continue;
        }

        let start = index;
        let mut depth = 0usize;
        let mut opened = false;
        let end = loop {
            let Some(line) = lines.get(index) else {
                return Err(ScanError::UnterminatedAggregate {
                    line: lines[start].number,
                });
            };
            for c in line.text.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            index += 1;
            if opened && depth == 0 {
                break index;
            }
        };

        let text = lines[start..end]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        spans.push(AggregateSpan {
            start_line: lines[start].number,
            lines: start..end,
            text,
        });
    }

    Ok(spans)
}

fn opens_aggregate(line: &str, next: Option<&str>) -> bool {
    let rest = line.strip_prefix("typedef ").unwrap_or(line).trim_start();
    if !rest.starts_with("struct ") && !rest.starts_with("struct{") {
        return false;
    }
    line.contains('{') || next.is_some_and(|n| n.starts_with('{'))
}

/// Names a struct body declares
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateNames {
    /// The tag, or the typedef alias of a tagless struct
    pub name: String,
    /// A typedef alias that differs from the tag (`typedef struct _Foo {...} Foo;`)
    pub alias: Option<String>,
}

impl LineParser {
    /// Recognize just the names of a struct body, skipping its members.
    pub(crate) fn parse_aggregate_names(&mut self) -> Result<AggregateNames, ParseError> {
        let (is_typedef, tag) = self.parse_aggregate_head()?;
        self.collect_until(&[Token::RBrace(self.current_location())]);
        self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' to close struct")?;
        let alias = self.parse_trailing_identifier();
        self.aggregate_names(is_typedef, tag, alias)
    }

    /// Recognize a full struct body, returning its names and member declarators.
    pub(crate) fn parse_aggregate(
        &mut self,
    ) -> Result<(AggregateNames, Vec<RawDeclarator>), ParseError> {
        let (is_typedef, tag) = self.parse_aggregate_head()?;
        let mut members = Vec::new();
        loop {
            if self.match_token(&Token::RBrace(self.current_location())) {
                break;
            }
            if self.is_at_end() {
                return self.mismatch("Expected '}' to close struct");
            }

            let group = self.collect_until(&[
                Token::Semicolon(self.current_location()),
                Token::RBrace(self.current_location()),
            ]);
            self.match_token(&Token::Semicolon(self.current_location()));
            if group.is_empty() {
                continue;
            }
            if group.iter().any(|t| matches!(t, Token::LBrace(_))) {
                log::trace!("Skipping nested body member '{}'", spell(&group));
                continue;
            }
            match split_member(&group) {
                Some(declarators) => members.extend(declarators),
                None => log::trace!("Unrecognized struct member '{}'", spell(&group)),
            }
        }

        let alias = self.parse_trailing_identifier();
        self.expect_semicolon("after struct body")?;
        self.expect_end("after struct body")?;

        let names = self.aggregate_names(is_typedef, tag, alias)?;
        Ok((names, members))
    }

    /// `["typedef"] "struct" [tag] "{"`
    fn parse_aggregate_head(&mut self) -> Result<(bool, Option<String>), ParseError> {
        let is_typedef = self.match_token(&Token::Typedef(self.current_location()));
        self.expect_token(&Token::Struct(self.current_location()), "Expected 'struct'")?;
        let tag = self.parse_trailing_identifier();
        self.expect_token(&Token::LBrace(self.current_location()), "Expected '{' after struct")?;
        Ok((is_typedef, tag))
    }

    fn parse_trailing_identifier(&mut self) -> Option<String> {
        match self.peek() {
            Token::Ident(ident, _) => {
                let ident = ident.clone();
                self.advance();
                Some(ident)
            }
            _ => None,
        }
    }

    fn aggregate_names(
        &self,
        is_typedef: bool,
        tag: Option<String>,
        alias: Option<String>,
    ) -> Result<AggregateNames, ParseError> {
        // Without `typedef`, a trailing identifier declares a variable
        let alias = alias.filter(|_| is_typedef);
        match (tag, alias) {
            (Some(tag), alias) => Ok(AggregateNames {
                alias: alias.filter(|alias| *alias != tag),
                name: tag,
            }),
            (None, Some(alias)) => Ok(AggregateNames { name: alias, alias: None }),
            (None, None) => self.mismatch("Anonymous struct"),
        }
    }
}

/// Split one member declaration, which may declare several names sharing a
/// base type (`float x, y, *next;`).
fn split_member(group: &[Token]) -> Option<Vec<RawDeclarator>> {
    if group.iter().any(|t| matches!(t, Token::LParen(_))) {
        return split_declarator(group).map(|d| vec![d]);
    }

    let mut parts = group.split(|t| matches!(t, Token::Comma(_)));
    let first = split_declarator(parts.next()?)?;

    let base = first.raw_type.trim_end_matches(['*', ' ']).to_string();
    let mut declarators = vec![first];
    for part in parts {
        let name = part.iter().map(Token::lexeme).collect::<String>();
        if !part.iter().any(|t| matches!(t, Token::Ident(_, _))) {
            return None;
        }
        declarators.push(RawDeclarator {
            raw_type: base.clone(),
            raw_name: Some(name),
            is_fn_pointer: false,
        });
    }
    Some(declarators)
}
