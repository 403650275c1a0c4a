//! file: core/src/ast/mod.rs
//! description: tokens, lexer, AST model and the recursive-descent parser.

pub mod err;
pub mod expr;
pub mod kind;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod precedence;
pub mod stmt;
pub mod token;

pub use err::SyntaxError;
pub use kind::{AstNodeKind, RecordField};
pub use lexer::tokenize;
pub use node::{ANON_EXPR_NAME, AstNode, Function, Item, Prototype};
pub use parser::{ParseResult, Parser};
pub use precedence::{NOT_A_BINOP, OperatorTable};
pub use token::{Token, TokenKind};

use crate::layout::RecordRegistry;

/// Parse every item in `tokens`, stopping at the first syntax error.
///
/// This is the strict form used by tests and tools that want an all-or-nothing
/// parse; the session driver recovers from errors item by item instead.
pub fn parse_items(tokens: &[Token], operators: &OperatorTable, records: &RecordRegistry) -> ParseResult<Vec<Item>> {
    let mut parser = Parser::new(tokens, operators, records);
    let mut items = Vec::new();
    loop {
        while parser.current().is_operator(';') {
            parser.advance();
        }
        if parser.is_at_end() {
            return Ok(items);
        }
        items.push(parser.parse_item()?);
    }
}

/// Lex and parse a single expression using the standard operator table and
/// the built-in record layouts.
pub fn parse_expression_str(source: &str) -> ParseResult<AstNode> {
    let tokens = tokenize("<input>", source);
    let operators = OperatorTable::standard();
    let records = RecordRegistry::with_builtins();
    let mut parser = Parser::new(&tokens, &operators, &records);
    parser.parse_expression()
}
