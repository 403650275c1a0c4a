//! file: core/src/error.rs
//! description: diagnostic severity and the trait shared by all pipeline errors.

use std::fmt;

use crate::location::{Location, Span};

/// Severity of a diagnostic. `Critical` aborts the run before any item is
/// compiled; the other levels fail at most one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of the lexer/parser, lowering, executor, config and script
/// errors, carried through the session and the CLI as `Box<dyn PosecErrorExt>`.
pub trait PosecErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    /// Dotted name of the component that raised the error, e.g. `posec.ir.lower`.
    fn issuer(&self) -> String;
    fn location(&self) -> Option<Location>;

    /// A zero-width span at `location` unless the error knows better.
    fn span(&self) -> Option<Span> {
        self.location().map(Span::point)
    }
}

impl fmt::Debug for dyn PosecErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosecError")
            .field("level", &self.level())
            .field("issuer", &self.issuer())
            .field("location", &self.location())
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for dyn PosecErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())?;
        if let Some(loc) = self.location() {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}
