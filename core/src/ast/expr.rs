//! file: core/src/ast/expr.rs
//! description: expression grammar rules.
//!
//! ```text
//! expression := primary (binop primary)*
//! primary    := number | identifier | identifier '(' args ')'
//!             | '(' expression ')' | if-expr | for-expr
//! if-expr    := 'if' expression 'then' expression 'else' expression
//! for-expr   := 'for' identifier '=' expression ',' expression
//!               (',' expression)? 'in' expression
//! ```
//!
//! Binary expressions use precedence climbing over the parser's
//! `OperatorTable`. A call whose callee names a registered record layout is
//! parsed as a record construction into freshly allocated storage.

use super::err::SyntaxError;
use super::kind::{AstNodeKind, RecordField};
use super::node::AstNode;
use super::parser::{ParseResult, Parser};
use super::token::TokenKind;

impl<'t> Parser<'t> {
    pub fn parse_expression(&mut self) -> ParseResult<AstNode> {
        let left = self.parse_primary()?;
        self.parse_bin_op_rhs(0, left)
    }

    pub(crate) fn parse_primary(&mut self) -> ParseResult<AstNode> {
        match self.current_kind() {
            TokenKind::Identifier => self.parse_identifier_expr(),
            TokenKind::Number => self.parse_number_expr(),
            TokenKind::LParen => self.parse_paren_expr(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::For => self.parse_for_expr(),
            TokenKind::Invalid => Err(SyntaxError::unexpected(
                format!("malformed number literal '{}'", self.current().text.as_deref().unwrap_or("")),
                self.current(),
                &["number"],
                "posec.ast.expr.parse_primary",
            )),
            _ => Err(SyntaxError::unexpected(
                "unknown token when expecting an expression",
                self.current(),
                &["number", "identifier", "'('", "'if'", "'for'"],
                "posec.ast.expr.parse_primary",
            )),
        }
    }

    /// Fold `(op primary)*` into `left` for every operator binding at least
    /// as tightly as `min_precedence`.
    pub(crate) fn parse_bin_op_rhs(&mut self, min_precedence: i32, mut left: AstNode) -> ParseResult<AstNode> {
        loop {
            let precedence = self.current_precedence();
            if precedence < min_precedence {
                return Ok(left);
            }

            let op_token = self.advance();
            let Some(op) = op_token.operator_symbol() else {
                return Ok(left);
            };

            let mut right = self.parse_primary()?;

            // A tighter operator after `right` takes `right` as its left operand.
            let next_precedence = self.current_precedence();
            if precedence < next_precedence {
                right = self.parse_bin_op_rhs(precedence + 1, right)?;
            }

            left = AstNode::new(
                AstNodeKind::BinaryOp { op, left: Box::new(left), right: Box::new(right) },
                op_token.location.clone(),
            );
        }
    }

    fn parse_number_expr(&mut self) -> ParseResult<AstNode> {
        let tok = self.advance();
        let value = tok.numeric_value.ok_or_else(|| {
            SyntaxError::unexpected("number token carries no value", tok, &["number"], "posec.ast.expr.parse_number_expr")
        })?;
        Ok(AstNode::new(AstNodeKind::Number { value }, tok.location.clone()))
    }

    /// Parentheses only group; the inner node is returned unwrapped.
    fn parse_paren_expr(&mut self) -> ParseResult<AstNode> {
        self.advance();
        let inner = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')'", &["')'"], "posec.ast.expr.parse_paren_expr")?;
        Ok(inner)
    }

    fn parse_identifier_expr(&mut self) -> ParseResult<AstNode> {
        let id_token = self.advance();
        let name = id_token.text.clone().unwrap_or_default();
        let location = id_token.location.clone();

        if !self.check(TokenKind::LParen) {
            return Ok(AstNode::new(AstNodeKind::Variable { name }, location));
        }
        self.advance();

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);

                match self.current_kind() {
                    TokenKind::RParen => break,
                    TokenKind::Comma => {
                        self.advance();
                    }
                    _ => {
                        return Err(SyntaxError::unexpected(
                            "expected ')' or ',' in argument list",
                            self.current(),
                            &["')'", "','"],
                            "posec.ast.expr.parse_identifier_expr",
                        ));
                    }
                }
            }
        }
        self.advance();

        if let Some(layout) = self.records.get(&name) {
            if args.len() != layout.field_count() {
                return Err(SyntaxError::with_message(
                    format!(
                        "record '{}' has {} field(s) but {} value(s) were given",
                        name,
                        layout.field_count(),
                        args.len()
                    ),
                    "posec.ast.expr.parse_identifier_expr",
                    location,
                ));
            }
            let destination = AstNode::new(AstNodeKind::Allocate { record: name }, location.clone());
            let fields = args
                .into_iter()
                .enumerate()
                .map(|(index, value)| RecordField { index, value })
                .collect();
            return Ok(AstNode::new(
                AstNodeKind::RecordConstruct { destination: Box::new(destination), fields },
                location,
            ));
        }

        Ok(AstNode::new(AstNodeKind::Call { callee: name, args }, location))
    }

    fn parse_if_expr(&mut self) -> ParseResult<AstNode> {
        let location = self.advance().location.clone();
        let issuer = "posec.ast.expr.parse_if_expr";

        let condition = self.parse_expression()?;

        if self.current_kind() != TokenKind::Then {
            return Err(SyntaxError::unexpected("expected 'then'", self.current(), &["'then'"], issuer));
        }
        self.advance();
        let then_branch = self.parse_expression()?;

        self.expect(TokenKind::Else, "expected 'else'", &["'else'"], issuer)?;
        let else_branch = self.parse_expression()?;

        Ok(AstNode::new(
            AstNodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            location,
        ))
    }

    fn parse_for_expr(&mut self) -> ParseResult<AstNode> {
        let location = self.advance().location.clone();
        let issuer = "posec.ast.expr.parse_for_expr";

        let var = self.expect_identifier("expected identifier after 'for'", issuer)?;
        self.expect(TokenKind::Equal, "expected '=' after 'for'", &["'='"], issuer)?;

        let start = self.parse_expression()?;
        self.expect(TokenKind::Comma, "expected ',' after 'for' start value", &["','"], issuer)?;

        let end = self.parse_expression()?;

        let step = if self.check(TokenKind::Comma) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(TokenKind::In, "expected 'in' after 'for'", &["'in'"], issuer)?;
        let body = self.parse_expression()?;

        Ok(AstNode::new(
            AstNodeKind::For { var, start: Box::new(start), end: Box::new(end), step, body: Box::new(body) },
            location,
        ))
    }
}
