//! file: core/src/ast/parser.rs
//! description: parser cursor and token helpers.
//!
//! The parser walks a borrowed token slice with a single forward-only cursor.
//! A rule that fails leaves the cursor wherever it stopped; there are no
//! checkpoints, so callers must treat any error as terminal for the current
//! top-level item. Grammar rules live in `expr.rs` (expressions) and
//! `stmt.rs` (prototypes, definitions, externs).

use super::err::SyntaxError;
use super::precedence::OperatorTable;
use super::token::{END_OF_STREAM, Token, TokenKind};
use crate::layout::RecordRegistry;

pub type ParseResult<T> = Result<T, SyntaxError>;

pub struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    pub(crate) operators: &'t OperatorTable,
    pub(crate) records: &'t RecordRegistry,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], operators: &'t OperatorTable, records: &'t RecordRegistry) -> Self {
        Parser { tokens, position: 0, operators, records }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The token under the cursor; `EndOfStream` once past the slice.
    pub fn current(&self) -> &'t Token {
        self.tokens.get(self.position).unwrap_or(&END_OF_STREAM)
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::EndOfStream)
    }

    /// Consume the current token and return it. Never moves past `len`.
    pub fn advance(&mut self) -> &'t Token {
        let tok = self.current();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        tok
    }

    /// Consume a token of `kind` or fail with `message`.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str, expected: &[&str], issuer: &str) -> ParseResult<&'t Token> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            Err(SyntaxError::unexpected(message, self.current(), expected, issuer))
        }
    }

    /// Consume an identifier and return its name.
    pub(crate) fn expect_identifier(&mut self, message: &str, issuer: &str) -> ParseResult<String> {
        let tok = self.expect(TokenKind::Identifier, message, &["identifier"], issuer)?;
        Ok(tok.text.clone().unwrap_or_default())
    }

    pub(crate) fn current_precedence(&self) -> i32 {
        self.operators.token_precedence(self.current())
    }
}
