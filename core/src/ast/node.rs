use crate::location::Location;

use super::kind::AstNodeKind;

/// Name given to the zero-parameter function wrapping a top-level expression.
pub const ANON_EXPR_NAME: &str = "anon_expr";

#[derive(Clone)]
pub struct AstNode {
    id: usize,
    pub kind: AstNodeKind,
    pub location: Option<Location>,
}

impl AstNode {
    fn create_id() -> usize {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new(kind: AstNodeKind, location: Option<Location>) -> Self {
        AstNode { id: Self::create_id(), kind, location }
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn get_kind(&self) -> &AstNodeKind {
        &self.kind
    }

    pub fn get_location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn number(value: f64) -> Self {
        AstNode::new(AstNodeKind::Number { value }, None)
    }

    pub fn variable(name: &str) -> Self {
        AstNode::new(AstNodeKind::Variable { name: name.to_string() }, None)
    }

    pub fn binary(op: char, left: AstNode, right: AstNode) -> Self {
        AstNode::new(AstNodeKind::BinaryOp { op, left: Box::new(left), right: Box::new(right) }, None)
    }

    pub fn call(callee: &str, args: Vec<AstNode>) -> Self {
        AstNode::new(AstNodeKind::Call { callee: callee.to_string(), args }, None)
    }
}

/// Structural equality: ids and locations are ignored.
impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

use std::fmt;

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("AstNode")
                .field("id", &self.id)
                .field("kind", &self.kind)
                .field("location", &self.location)
                .finish()
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Function name and parameter names, independent of any body.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub location: Option<Location>,
}

impl Prototype {
    pub fn new(name: &str, params: Vec<String>) -> Self {
        Prototype { name: name.to_string(), params, location: None }
    }

    pub fn anonymous() -> Self {
        Prototype::new(ANON_EXPR_NAME, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: AstNode,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} {}", self.proto, self.body)
    }
}

/// One top-level unit of a token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Definition(Function),
    Extern(Prototype),
    /// A bare expression, wrapped in a function named [`ANON_EXPR_NAME`].
    Expression(Function),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Definition(func) | Item::Expression(func) => &func.proto.name,
            Item::Extern(proto) => &proto.name,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Definition(func) => write!(f, "{}", func),
            Item::Extern(proto) => write!(f, "extern {}", proto),
            Item::Expression(func) => write!(f, "{}", func.body),
        }
    }
}
