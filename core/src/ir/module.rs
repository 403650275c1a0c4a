use crate::ir::op::{BlockId, IROp};
use crate::ir::value::IrType;
use crate::layout::RecordRegistry;

use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrBlock {
    pub label: String,
    pub ops: Vec<IROp>,
}

impl IrBlock {
    pub fn new(label: String) -> Self {
        IrBlock { label, ops: Vec::new() }
    }

    pub fn terminator(&self) -> Option<&IROp> {
        self.ops.last().filter(|op| op.is_terminator())
    }

    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator().map(|t| t.successors()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrSignature {
    pub name: String,
    pub params: Vec<String>,
    pub ret: IrType,
}

impl IrSignature {
    /// Signature of an externally provided `f64 (f64, ...)` function.
    pub fn external(name: &str, params: &[String]) -> Self {
        IrSignature { name: name.to_string(), params: params.to_vec(), ret: IrType::F64 }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A function body (`blocks` non-empty) or a bare declaration.
///
/// Parameters occupy registers `0..arity`; `reg_types[r]` is the type of
/// register `r`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrFunction {
    pub signature: IrSignature,
    pub blocks: Vec<IrBlock>,
    pub reg_types: Vec<IrType>,
}

impl IrFunction {
    pub fn declaration(signature: IrSignature) -> Self {
        IrFunction { signature, blocks: Vec::new(), reg_types: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All ops of all blocks, in block order.
    pub fn ops(&self) -> impl Iterator<Item = &IROp> {
        self.blocks.iter().flat_map(|b| b.ops.iter())
    }
}

impl std::fmt::Display for IrFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .signature
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| format!("r{}: {}", i, p))
            .collect::<Vec<_>>()
            .join(", ");
        if self.is_declaration() {
            return writeln!(f, "declare {}({}) -> {}", self.signature.name, params, self.signature.ret);
        }
        writeln!(f, "define {}({}) -> {} {{", self.signature.name, params, self.signature.ret)?;
        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(f, "bb{} ({}):", i, block.label)?;
            for op in block.ops.iter() {
                writeln!(f, "    {}", op)?;
            }
        }
        writeln!(f, "}}")
    }
}

/// The compilation unit: functions in insertion order plus the record
/// layouts their allocations refer to.
#[derive(Debug, Clone, Serialize)]
pub struct IrModule {
    functions: Vec<IrFunction>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    records: RecordRegistry,
}

impl IrModule {
    pub fn new(records: RecordRegistry) -> Self {
        IrModule { functions: Vec::new(), index: HashMap::new(), records }
    }

    pub fn records(&self) -> &RecordRegistry {
        &self.records
    }

    pub fn get_function(&self, name: &str) -> Option<&IrFunction> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &IrFunction> {
        self.functions.iter()
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Add a declaration for `signature` unless a function of that name is
    /// already present. Returns true when something was added.
    pub fn declare_function(&mut self, signature: IrSignature) -> bool {
        if self.contains(&signature.name) {
            return false;
        }
        self.push(IrFunction::declaration(signature));
        true
    }

    /// Insert a function body, replacing a declaration of the same name.
    pub fn define_function(&mut self, function: IrFunction) {
        match self.index.get(function.name()) {
            Some(&i) => self.functions[i] = function,
            None => self.push(function),
        }
    }

    pub fn remove_function(&mut self, name: &str) -> Option<IrFunction> {
        let i = self.index.remove(name)?;
        let removed = self.functions.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    fn push(&mut self, function: IrFunction) {
        self.index.insert(function.name().to_string(), self.functions.len());
        self.functions.push(function);
    }
}

impl std::fmt::Display for IrModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for layout in self.records.iter() {
            writeln!(f, "{}", layout)?;
        }
        for function in self.functions.iter() {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
