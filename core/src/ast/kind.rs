//! file: core/src/ast/kind.rs
//! description: expression node kinds.
//!
//! `AstNodeKind` is the closed set of expression forms the parser builds and
//! lowering consumes. Adding a variant means updating every `match` over it.
//!
use super::node::AstNode;

/// One positional assignment inside a record construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Position of the field in the record layout.
    pub index: usize,
    pub value: AstNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNodeKind {
    Number { value: f64 },
    Variable { name: String },
    BinaryOp { op: char, left: Box<AstNode>, right: Box<AstNode> },
    Call { callee: String, args: Vec<AstNode> },
    If { condition: Box<AstNode>, then_branch: Box<AstNode>, else_branch: Box<AstNode> },
    For {
        var: String,
        start: Box<AstNode>,
        end: Box<AstNode>,
        step: Option<Box<AstNode>>,
        body: Box<AstNode>,
    },
    /// Fresh storage for one record of the named layout.
    Allocate { record: String },
    RecordConstruct { destination: Box<AstNode>, fields: Vec<RecordField> },
}

impl AstNodeKind {
    /// Short variant name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            AstNodeKind::Number { .. } => "Number",
            AstNodeKind::Variable { .. } => "Variable",
            AstNodeKind::BinaryOp { .. } => "BinaryOp",
            AstNodeKind::Call { .. } => "Call",
            AstNodeKind::If { .. } => "If",
            AstNodeKind::For { .. } => "For",
            AstNodeKind::Allocate { .. } => "Allocate",
            AstNodeKind::RecordConstruct { .. } => "RecordConstruct",
        }
    }
}

use std::fmt;

/// S-expression rendering: `(+ a (* b c))`, `(call f a b)`, `(if c t e)`.
impl fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNodeKind::Number { value } => write!(f, "{}", value),
            AstNodeKind::Variable { name } => write!(f, "{}", name),
            AstNodeKind::BinaryOp { op, left, right } => write!(f, "({} {} {})", op, left, right),
            AstNodeKind::Call { callee, args } => {
                write!(f, "(call {}", callee)?;
                for a in args {
                    write!(f, " {}", a)?;
                }
                write!(f, ")")
            }
            AstNodeKind::If { condition, then_branch, else_branch } => {
                write!(f, "(if {} {} {})", condition, then_branch, else_branch)
            }
            AstNodeKind::For { var, start, end, step, body } => {
                write!(f, "(for {} {} {}", var, start, end)?;
                if let Some(step) = step {
                    write!(f, " {}", step)?;
                }
                write!(f, " {})", body)
            }
            AstNodeKind::Allocate { record } => write!(f, "(alloc {})", record),
            AstNodeKind::RecordConstruct { destination, fields } => {
                write!(f, "(record {}", destination)?;
                for field in fields {
                    write!(f, " [{}]={}", field.index, field.value)?;
                }
                write!(f, ")")
            }
        }
    }
}
