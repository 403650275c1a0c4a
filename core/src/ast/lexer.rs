//! file: core/src/ast/lexer.rs
//! description: source text to token stream.
//!
//! Identifiers are `[A-Za-z][A-Za-z0-9_]*`, numbers are runs of digits and
//! dots, `#` starts a comment running to the end of the line. `(`, `)`, `,`
//! and `=` have their own kinds; every other printable character becomes an
//! `Operator` token. The stream always ends with an `EndOfStream` token.
//!
//! Lexing never fails: text that is not a valid number becomes an `Invalid`
//! token, and the parser reports it as an error of the item it appears in.

use super::token::{Token, TokenKind};
use crate::location::Location;

pub struct Lexer<'s> {
    file: String,
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    line: usize,
    column: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(file: &str, source: &'s str) -> Self {
        Lexer { file: file.to_string(), chars: source.chars().peekable(), line: 1, column: 1 }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Location {
        Location::new(self.file.as_str(), self.line, self.column)
    }

    fn take_while(&mut self, first: char, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let at = self.here();
            let Some(c) = self.bump() else {
                tokens.push(Token::new(TokenKind::EndOfStream).with_location(at));
                return tokens;
            };

            if c.is_whitespace() {
                continue;
            }

            if c == '#' {
                while let Some(&n) = self.chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            let token = if c.is_ascii_alphabetic() {
                let word = self.take_while(c, |n| n.is_ascii_alphanumeric() || n == '_');
                match TokenKind::keyword(&word) {
                    Some(kind) => Token::new(kind),
                    None => Token::identifier(&word),
                }
            } else if c.is_ascii_digit() || c == '.' {
                let text = self.take_while(c, |n| n.is_ascii_digit() || n == '.');
                match text.parse::<f64>() {
                    Ok(value) => Token::number(value),
                    Err(_) => Token::invalid(&text),
                }
            } else {
                match c {
                    '(' => Token::new(TokenKind::LParen),
                    ')' => Token::new(TokenKind::RParen),
                    ',' => Token::new(TokenKind::Comma),
                    '=' => Token::new(TokenKind::Equal),
                    other => Token::operator(other),
                }
            };
            tokens.push(token.with_location(at));
        }
    }
}

/// Tokenize `source`, tagging locations with `file`.
pub fn tokenize(file: &str, source: &str) -> Vec<Token> {
    Lexer::new(file, source).tokenize()
}
