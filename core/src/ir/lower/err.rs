use crate::ast::AstNode;
use crate::error::{Level, PosecErrorExt};
use crate::ir::value::IrType;
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum LoweringErrorKind {
    UnboundVariable { name: String },
    UnknownFunction { name: String },
    ArityMismatch { name: String, expected: usize, found: usize },
    UnsupportedOperator { op: char },
    /// The destination of a record construction is not usable storage.
    AllocationFailure { reason: String },
    TypeMismatch { expected: IrType, found: IrType },
    Redefinition { name: String },
    /// The finished function failed structural verification.
    InvalidFunction { reason: String },
}

impl std::fmt::Display for LoweringErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoweringErrorKind::UnboundVariable { name } => write!(f, "unbound variable '{}'", name),
            LoweringErrorKind::UnknownFunction { name } => write!(f, "unknown function '{}'", name),
            LoweringErrorKind::ArityMismatch { name, expected, found } => write!(
                f,
                "function '{}' takes {} argument(s) but {} were supplied",
                name, expected, found
            ),
            LoweringErrorKind::UnsupportedOperator { op } => write!(f, "unsupported binary operator '{}'", op),
            LoweringErrorKind::AllocationFailure { reason } => write!(f, "allocation failure: {}", reason),
            LoweringErrorKind::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            LoweringErrorKind::Redefinition { name } => write!(f, "function '{}' cannot be redefined", name),
            LoweringErrorKind::InvalidFunction { reason } => write!(f, "invalid function: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoweringError {
    kind: LoweringErrorKind,
    node: &'static str,
    function: Option<String>,
    location: Option<Location>,
}

impl LoweringError {
    /// Error raised while lowering `node`.
    pub fn at(kind: LoweringErrorKind, node: &AstNode) -> Self {
        LoweringError { kind, node: node.kind.name(), function: None, location: node.location.clone() }
    }

    /// Error raised for a whole function or prototype rather than one node.
    pub fn for_item(kind: LoweringErrorKind, item: &'static str, location: Option<Location>) -> Self {
        LoweringError { kind, node: item, function: None, location }
    }

    /// Record the function being lowered, keeping an earlier one if set.
    pub fn in_function(mut self, name: &str) -> Self {
        if self.function.is_none() {
            self.function = Some(name.to_string());
        }
        self
    }

    pub fn kind(&self) -> &LoweringErrorKind {
        &self.kind
    }

    /// Name of the AST node kind (or item) being lowered.
    pub fn node(&self) -> &str {
        self.node
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoweringError {}

impl PosecErrorExt for LoweringError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        match &self.function {
            Some(func) => format!("{} while lowering {} in '{}'", self.kind, self.node, func),
            None => format!("{} while lowering {}", self.kind, self.node),
        }
    }

    fn issuer(&self) -> String {
        "posec.ir.lower".to_string()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
