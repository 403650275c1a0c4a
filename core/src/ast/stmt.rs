//! file: core/src/ast/stmt.rs
//! description: top-level grammar rules.
//!
//! ```text
//! prototype      := identifier '(' identifier* ')'
//! definition     := 'def' prototype expression
//! extern-decl    := 'extern' prototype
//! top-level-expr := expression
//! ```
//!
//! Prototype parameters are whitespace separated (`def f(a b c)`), unlike
//! call arguments which are comma separated. The name `anon_expr` belongs to
//! top-level expressions and cannot be declared.

use super::err::SyntaxError;
use super::node::{ANON_EXPR_NAME, Function, Item, Prototype};
use super::parser::{ParseResult, Parser};
use super::token::TokenKind;

impl<'t> Parser<'t> {
    pub fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let issuer = "posec.ast.stmt.parse_prototype";
        let location = self.current().location.clone();

        let name = self.expect_identifier("expected function name in prototype", issuer)?;
        if name == ANON_EXPR_NAME {
            return Err(SyntaxError::with_message(
                format!("'{}' is reserved for top-level expressions", ANON_EXPR_NAME),
                issuer,
                location,
            ));
        }
        self.expect(TokenKind::LParen, "expected '(' in prototype", &["'('"], issuer)?;

        let mut params = Vec::new();
        while self.check(TokenKind::Identifier) {
            params.push(self.advance().text.clone().unwrap_or_default());
        }

        self.expect(TokenKind::RParen, "expected ')' in prototype", &["')'", "identifier"], issuer)?;

        Ok(Prototype { name, params, location })
    }

    pub fn parse_definition(&mut self) -> ParseResult<Function> {
        self.expect(TokenKind::Def, "expected 'def'", &["'def'"], "posec.ast.stmt.parse_definition")?;
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function { proto, body })
    }

    pub fn parse_extern(&mut self) -> ParseResult<Prototype> {
        self.expect(TokenKind::Extern, "expected 'extern'", &["'extern'"], "posec.ast.stmt.parse_extern")?;
        self.parse_prototype()
    }

    /// Parse a bare expression as the body of a zero-parameter `anon_expr`.
    pub fn parse_top_level_expr(&mut self) -> ParseResult<Function> {
        let location = self.current().location.clone();
        let body = self.parse_expression()?;
        let mut proto = Prototype::anonymous();
        proto.location = location;
        Ok(Function { proto, body })
    }

    /// Dispatch on the current token to the matching top-level rule.
    pub fn parse_item(&mut self) -> ParseResult<Item> {
        match self.current_kind() {
            TokenKind::Def => self.parse_definition().map(Item::Definition),
            TokenKind::Extern => self.parse_extern().map(Item::Extern),
            _ => self.parse_top_level_expr().map(Item::Expression),
        }
    }
}
