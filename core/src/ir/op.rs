use serde::Serialize;

use super::value::Value;

pub type Register = usize;
pub type BlockId = usize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IROp {
    LConst { dest: Register, value: Value },

    Add { dest: Register, src1: Register, src2: Register },
    Sub { dest: Register, src1: Register, src2: Register },
    Mul { dest: Register, src1: Register, src2: Register },
    Div { dest: Register, src1: Register, src2: Register },

    /// Comparisons yield `1.0` or `0.0`.
    Lt { dest: Register, src1: Register, src2: Register },
    Gt { dest: Register, src1: Register, src2: Register },

    /// `src != 0.0` as a branch condition.
    Truthy { dest: Register, src: Register },

    Call { dest: Register, callee: String, args: Vec<Register> },

    Alloca { dest: Register, record: String },
    /// Address of `base[indices[0]].field[indices[1]]`.
    FieldAddr { dest: Register, base: Register, indices: [usize; 2] },
    Store { src: Register, addr: Register },

    Phi { dest: Register, incoming: Vec<(Register, BlockId)> },

    Jump { target: BlockId },
    Branch { cond: Register, then_block: BlockId, else_block: BlockId },
    Ret { src: Register },
}

impl IROp {
    pub fn dest(&self) -> Option<Register> {
        match self {
            IROp::LConst { dest, .. }
            | IROp::Add { dest, .. }
            | IROp::Sub { dest, .. }
            | IROp::Mul { dest, .. }
            | IROp::Div { dest, .. }
            | IROp::Lt { dest, .. }
            | IROp::Gt { dest, .. }
            | IROp::Truthy { dest, .. }
            | IROp::Call { dest, .. }
            | IROp::Alloca { dest, .. }
            | IROp::FieldAddr { dest, .. }
            | IROp::Phi { dest, .. } => Some(*dest),
            IROp::Store { .. } | IROp::Jump { .. } | IROp::Branch { .. } | IROp::Ret { .. } => None,
        }
    }

    /// Registers read by this op.
    pub fn operands(&self) -> Vec<Register> {
        match self {
            IROp::LConst { .. } | IROp::Alloca { .. } | IROp::Jump { .. } => Vec::new(),
            IROp::Add { src1, src2, .. }
            | IROp::Sub { src1, src2, .. }
            | IROp::Mul { src1, src2, .. }
            | IROp::Div { src1, src2, .. }
            | IROp::Lt { src1, src2, .. }
            | IROp::Gt { src1, src2, .. } => vec![*src1, *src2],
            IROp::Truthy { src, .. } | IROp::Ret { src } => vec![*src],
            IROp::Call { args, .. } => args.clone(),
            IROp::FieldAddr { base, .. } => vec![*base],
            IROp::Store { src, addr } => vec![*src, *addr],
            IROp::Phi { incoming, .. } => incoming.iter().map(|(r, _)| *r).collect(),
            IROp::Branch { cond, .. } => vec![*cond],
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, IROp::Jump { .. } | IROp::Branch { .. } | IROp::Ret { .. })
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            IROp::Jump { target } => vec![*target],
            IROp::Branch { then_block, else_block, .. } => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for IROp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IROp::LConst { dest, value } => write!(f, "r{} = const {}", dest, value),
            IROp::Add { dest, src1, src2 } => write!(f, "r{} = add r{}, r{}", dest, src1, src2),
            IROp::Sub { dest, src1, src2 } => write!(f, "r{} = sub r{}, r{}", dest, src1, src2),
            IROp::Mul { dest, src1, src2 } => write!(f, "r{} = mul r{}, r{}", dest, src1, src2),
            IROp::Div { dest, src1, src2 } => write!(f, "r{} = div r{}, r{}", dest, src1, src2),
            IROp::Lt { dest, src1, src2 } => write!(f, "r{} = lt r{}, r{}", dest, src1, src2),
            IROp::Gt { dest, src1, src2 } => write!(f, "r{} = gt r{}, r{}", dest, src1, src2),
            IROp::Truthy { dest, src } => write!(f, "r{} = truthy r{}", dest, src),
            IROp::Call { dest, callee, args } => {
                write!(f, "r{} = call {}(", dest, callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "r{}", arg)?;
                }
                write!(f, ")")
            }
            IROp::Alloca { dest, record } => write!(f, "r{} = alloca {}", dest, record),
            IROp::FieldAddr { dest, base, indices } => {
                write!(f, "r{} = fieldaddr r{}, [{}, {}]", dest, base, indices[0], indices[1])
            }
            IROp::Store { src, addr } => write!(f, "store r{}, r{}", src, addr),
            IROp::Phi { dest, incoming } => {
                write!(f, "r{} = phi", dest)?;
                for (i, (reg, block)) in incoming.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " [r{}, bb{}]", reg, block)?;
                }
                Ok(())
            }
            IROp::Jump { target } => write!(f, "jmp bb{}", target),
            IROp::Branch { cond, then_block, else_block } => {
                write!(f, "br r{}, bb{}, bb{}", cond, then_block, else_block)
            }
            IROp::Ret { src } => write!(f, "ret r{}", src),
        }
    }
}
