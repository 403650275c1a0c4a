//! Binary operator precedence table used by the precedence-climbing parser.

use std::collections::HashMap;

use super::token::Token;

/// Precedence reported for tokens that are not binary operators.
pub const NOT_A_BINOP: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorTable {
    precedences: HashMap<char, i32>,
}

impl OperatorTable {
    pub fn empty() -> Self {
        OperatorTable { precedences: HashMap::new() }
    }

    /// `<`/`>` bind loosest, then `+`/`-`, then `*`/`/`.
    pub fn standard() -> Self {
        let mut table = OperatorTable::empty();
        table.insert('<', 10);
        table.insert('>', 10);
        table.insert('+', 20);
        table.insert('-', 20);
        table.insert('*', 40);
        table.insert('/', 40);
        table
    }

    pub fn insert(&mut self, symbol: char, precedence: i32) {
        self.precedences.insert(symbol, precedence);
    }

    pub fn remove(&mut self, symbol: char) {
        self.precedences.remove(&symbol);
    }

    pub fn precedence(&self, symbol: char) -> Option<i32> {
        self.precedences.get(&symbol).copied()
    }

    /// Precedence of `token` as a binary operator, or [`NOT_A_BINOP`].
    pub fn token_precedence(&self, token: &Token) -> i32 {
        token
            .operator_symbol()
            .and_then(|c| self.precedence(c))
            .filter(|p| *p > 0)
            .unwrap_or(NOT_A_BINOP)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.precedences.iter().map(|(c, p)| (*c, *p))
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::standard()
    }
}
