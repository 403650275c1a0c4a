//! Structural checks on a finished function body.

use std::collections::HashSet;

use super::module::IrFunction;
use super::op::IROp;

/// Check that every block ends in exactly one terminator, every branch target
/// exists, phis lead their block and only name real predecessors, and every
/// register is allocated.
pub fn verify_function(function: &IrFunction) -> Result<(), String> {
    let name = function.name();
    if function.is_declaration() {
        return Ok(());
    }

    let block_count = function.blocks.len();
    let reg_count = function.reg_types.len();
    let mut preds: Vec<HashSet<usize>> = vec![HashSet::new(); block_count];

    for (b, block) in function.blocks.iter().enumerate() {
        let Some(last) = block.ops.last() else {
            return Err(format!("{}: block bb{} ({}) is empty", name, b, block.label));
        };
        if !last.is_terminator() {
            return Err(format!("{}: block bb{} ({}) does not end in a terminator", name, b, block.label));
        }
        for target in last.successors() {
            if target >= block_count {
                return Err(format!("{}: bb{} branches to missing block bb{}", name, b, target));
            }
            preds[target].insert(b);
        }
    }

    for (b, block) in function.blocks.iter().enumerate() {
        let mut leading_phis = true;
        for (i, op) in block.ops.iter().enumerate() {
            if op.is_terminator() && i + 1 != block.ops.len() {
                return Err(format!("{}: terminator in the middle of bb{}", name, b));
            }
            let is_phi = matches!(op, IROp::Phi { .. });
            if is_phi && !leading_phis {
                return Err(format!("{}: phi after a non-phi op in bb{}", name, b));
            }
            leading_phis &= is_phi;

            if let IROp::Phi { incoming, .. } = op {
                for (_, from) in incoming.iter() {
                    if !preds[b].contains(from) {
                        return Err(format!("{}: phi in bb{} names bb{}, which is not a predecessor", name, b, from));
                    }
                }
            }

            let regs = op.dest().into_iter().chain(op.operands());
            for reg in regs {
                if reg >= reg_count {
                    return Err(format!("{}: register r{} is not allocated", name, reg));
                }
            }
        }
    }

    Ok(())
}
