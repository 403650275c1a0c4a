//! file: core/src/ast/token.rs
//! description: token model consumed by the parser.
//!
//! Tokens are produced by `ast::lexer` (or by any other front end that can
//! build the same records) and are borrowed read-only by the parser.

use serde::Serialize;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Number,
    LParen,
    RParen,
    Comma,
    Equal,
    /// Any other single-character symbol; the symbol is in `Token::text`.
    Operator,
    If,
    Then,
    Else,
    For,
    In,
    Def,
    Extern,
    /// Text the lexer could not turn into a token, kept in `Token::text`.
    Invalid,
    EndOfStream,
}

impl TokenKind {
    /// Keyword lookup for identifiers produced by the lexer.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "for" => Some(TokenKind::For),
            "in" => Some(TokenKind::In),
            "def" => Some(TokenKind::Def),
            "extern" => Some(TokenKind::Extern),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Equal => "'='",
            TokenKind::Operator => "operator",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Def => "'def'",
            TokenKind::Extern => "'extern'",
            TokenKind::Invalid => "invalid token",
            TokenKind::EndOfStream => "end of input",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub numeric_value: Option<f64>,
    pub text: Option<String>,
    pub location: Option<Location>,
}

/// Returned by the parser cursor once it runs past the end of the slice.
pub static END_OF_STREAM: Token = Token {
    kind: TokenKind::EndOfStream,
    numeric_value: None,
    text: None,
    location: None,
};

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Token { kind, numeric_value: None, text: None, location: None }
    }

    pub fn number(value: f64) -> Self {
        Token { kind: TokenKind::Number, numeric_value: Some(value), text: None, location: None }
    }

    pub fn identifier(name: &str) -> Self {
        Token { kind: TokenKind::Identifier, numeric_value: None, text: Some(name.to_string()), location: None }
    }

    pub fn operator(symbol: char) -> Self {
        Token { kind: TokenKind::Operator, numeric_value: None, text: Some(symbol.to_string()), location: None }
    }

    pub fn invalid(text: &str) -> Self {
        Token { kind: TokenKind::Invalid, numeric_value: None, text: Some(text.to_string()), location: None }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The operator character of an `Operator` token.
    pub fn operator_symbol(&self) -> Option<char> {
        if self.kind != TokenKind::Operator {
            return None;
        }
        let mut chars = self.text.as_deref()?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn is_operator(&self, symbol: char) -> bool {
        self.operator_symbol() == Some(symbol)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text.as_deref().unwrap_or("")),
            TokenKind::Number => match self.numeric_value {
                Some(v) => write!(f, "number {}", v),
                None => write!(f, "number"),
            },
            TokenKind::Operator => write!(f, "'{}'", self.text.as_deref().unwrap_or("?")),
            TokenKind::Invalid => write!(f, "invalid token '{}'", self.text.as_deref().unwrap_or("")),
            other => write!(f, "{}", other),
        }
    }
}
