use serde::Serialize;

/// Compile-time constant carried by `IROp::LConst`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Value {
    Float(f64),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// Static type of a virtual register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum IrType {
    F64,
    Bool,
    /// Address of (a field of) a record with the named layout.
    Ptr(String),
}

impl std::fmt::Display for IrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::F64 => write!(f, "f64"),
            IrType::Bool => write!(f, "bool"),
            IrType::Ptr(record) => write!(f, "ptr<{}>", record),
        }
    }
}
