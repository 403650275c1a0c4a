use crate::error::{Level, PosecErrorExt};
use crate::location::Location;

use super::token::Token;

/// A parse failure. Carries the offending token (when there is one) and the
/// set of tokens the rule would have accepted at that point.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    level: Level,
    message: String,
    issuer: String,
    token: Option<Token>,
    expected: Vec<String>,
    location: Option<Location>,
}

impl SyntaxError {
    /// Error raised by a grammar rule that found `token` where one of
    /// `expected` should have been.
    pub fn unexpected(message: impl Into<String>, token: &Token, expected: &[&str], issuer: &str) -> Self {
        SyntaxError {
            level: Level::Error,
            message: message.into(),
            issuer: issuer.to_string(),
            token: Some(token.clone()),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            location: token.location.clone(),
        }
    }

    pub fn with_message(message: impl Into<String>, issuer: &str, location: Option<Location>) -> Self {
        SyntaxError {
            level: Level::Error,
            message: message.into(),
            issuer: issuer.to_string(),
            token: None,
            expected: Vec::new(),
            location,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// The bare rule message, without token or location decoration.
    pub fn text(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(tok) = &self.token {
            write!(f, ", found {}", tok)?;
        }
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

impl PosecErrorExt for SyntaxError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        match &self.token {
            Some(tok) => format!("{}, found {}", self.message, tok),
            None => self.message.clone(),
        }
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
