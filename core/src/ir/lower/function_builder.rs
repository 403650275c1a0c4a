use crate::ir::module::{IrBlock, IrFunction, IrSignature};
use crate::ir::op::{BlockId, IROp, Register};
use crate::ir::value::{IrType, Value};
use std::collections::HashMap;

/// A per-function lowering helper: virtual register allocator with register
/// types, basic blocks with an insertion point, and the name -> register
/// bindings visible to the body being lowered.
///
/// Nothing here touches the module. `finish` hands back the function and the
/// declarations it depends on so the caller can commit both at once, or drop
/// them if lowering failed.
pub struct FunctionBuilder {
    name: String,
    blocks: Vec<IrBlock>,
    current: BlockId,
    reg_types: Vec<IrType>,
    bindings: HashMap<String, Register>,
    label_counts: HashMap<String, usize>,
    pending_decls: Vec<IrSignature>,
}

impl FunctionBuilder {
    /// New builder positioned at the end of an empty `entry` block.
    pub fn new(name: &str) -> Self {
        FunctionBuilder {
            name: name.to_string(),
            blocks: vec![IrBlock::new("entry".to_string())],
            current: 0,
            reg_types: Vec::new(),
            bindings: HashMap::new(),
            label_counts: HashMap::new(),
            pending_decls: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alloc_reg(&mut self, ty: IrType) -> Register {
        self.reg_types.push(ty);
        self.reg_types.len() - 1
    }

    pub fn reg_type(&self, reg: Register) -> &IrType {
        &self.reg_types[reg]
    }

    /// Append a block with a unique label derived from `label`.
    pub fn append_block(&mut self, label: &str) -> BlockId {
        let count = self.label_counts.entry(label.to_string()).or_insert(0);
        let unique = if *count == 0 { label.to_string() } else { format!("{}{}", label, count) };
        *count += 1;
        self.blocks.push(IrBlock::new(unique));
        self.blocks.len() - 1
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn block(&self, block: BlockId) -> &IrBlock {
        &self.blocks[block]
    }

    pub fn emit_op(&mut self, op: IROp) {
        self.blocks[self.current].ops.push(op);
    }

    pub fn const_f64(&mut self, value: f64) -> Register {
        let dest = self.alloc_reg(IrType::F64);
        self.emit_op(IROp::LConst { dest, value: Value::Float(value) });
        dest
    }

    /// Add an incoming edge to the phi defining `dest` in `block`.
    pub fn add_phi_incoming(&mut self, block: BlockId, dest: Register, incoming: (Register, BlockId)) {
        for op in self.blocks[block].ops.iter_mut() {
            if let IROp::Phi { dest: d, incoming: edges } = op {
                if *d == dest {
                    edges.push(incoming);
                    return;
                }
            }
        }
    }

    /// Bind `name` to `reg`, returning the binding it shadows.
    pub fn bind(&mut self, name: &str, reg: Register) -> Option<Register> {
        self.bindings.insert(name.to_string(), reg)
    }

    /// Undo a `bind`, putting back whatever it shadowed.
    pub fn restore(&mut self, name: &str, previous: Option<Register>) {
        match previous {
            Some(reg) => {
                self.bindings.insert(name.to_string(), reg);
            }
            None => {
                self.bindings.remove(name);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Register> {
        self.bindings.get(name).copied()
    }

    /// Remember a declaration this function's calls rely on.
    pub fn queue_declaration(&mut self, signature: IrSignature) {
        if !self.pending_decls.iter().any(|s| s.name == signature.name) {
            self.pending_decls.push(signature);
        }
    }

    pub fn finish(self, signature: IrSignature) -> (IrFunction, Vec<IrSignature>) {
        let function = IrFunction { signature, blocks: self.blocks, reg_types: self.reg_types };
        (function, self.pending_decls)
    }
}
