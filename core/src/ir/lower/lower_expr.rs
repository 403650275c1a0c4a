//! file: core/src/ir/lower/lower_expr.rs
//! description: expression lowering.
//!
//! Each AST expression lowers into the current block of a `FunctionBuilder`
//! and yields the register holding its value. Children are lowered first,
//! left to right. Control flow (`if`, `for`) appends blocks and leaves the
//! builder positioned in the continuation block.
//!
use crate::ast::{AstNode, AstNodeKind};
use crate::ir::module::IrModule;
use crate::ir::op::{IROp, Register};
use crate::ir::value::IrType;

use super::err::{LoweringError, LoweringErrorKind};
use super::function_builder::FunctionBuilder;
use super::lower_record;
use super::lowering_context::{LoweringContext, Resolved};

pub type LowerResult<T> = Result<T, LoweringError>;

/// Lower `expr` into `builder`, returning the register that holds its value.
pub fn lower_expr(
    expr: &AstNode,
    builder: &mut FunctionBuilder,
    ctx: &LoweringContext,
    module: &IrModule,
) -> LowerResult<Register> {
    match expr.get_kind() {
        AstNodeKind::Number { value } => Ok(builder.const_f64(*value)),
        AstNodeKind::Variable { name } => builder.lookup(name).ok_or_else(|| {
            LoweringError::at(LoweringErrorKind::UnboundVariable { name: name.clone() }, expr)
        }),
        AstNodeKind::BinaryOp { op, left, right } => {
            let l = lower_expr(left, builder, ctx, module)?;
            let r = lower_expr(right, builder, ctx, module)?;
            expect_type(builder, l, &IrType::F64, left)?;
            expect_type(builder, r, &IrType::F64, right)?;
            let dest = builder.alloc_reg(IrType::F64);
            let op = match *op {
                '+' => IROp::Add { dest, src1: l, src2: r },
                '-' => IROp::Sub { dest, src1: l, src2: r },
                '*' => IROp::Mul { dest, src1: l, src2: r },
                '/' => IROp::Div { dest, src1: l, src2: r },
                '<' => IROp::Lt { dest, src1: l, src2: r },
                '>' => IROp::Gt { dest, src1: l, src2: r },
                other => {
                    return Err(LoweringError::at(LoweringErrorKind::UnsupportedOperator { op: other }, expr));
                }
            };
            builder.emit_op(op);
            Ok(dest)
        }
        AstNodeKind::Call { callee, args } => lower_call(expr, callee, args, builder, ctx, module),
        AstNodeKind::If { condition, then_branch, else_branch } => {
            lower_if(condition, then_branch, else_branch, builder, ctx, module)
        }
        AstNodeKind::For { var, start, end, step, body } => {
            lower_for(var, start, end, step.as_deref(), body, builder, ctx, module)
        }
        AstNodeKind::Allocate { record } => lower_record::lower_allocate(expr, record, builder, module),
        AstNodeKind::RecordConstruct { destination, fields } => {
            lower_record::lower_record_construct(expr, destination, fields, builder, ctx, module)
        }
    }
}

/// Fail with `TypeMismatch` unless `reg` has type `expected`.
pub(crate) fn expect_type(
    builder: &FunctionBuilder,
    reg: Register,
    expected: &IrType,
    node: &AstNode,
) -> LowerResult<()> {
    let found = builder.reg_type(reg);
    if found == expected {
        Ok(())
    } else {
        Err(LoweringError::at(
            LoweringErrorKind::TypeMismatch { expected: expected.clone(), found: found.clone() },
            node,
        ))
    }
}

fn lower_call(
    expr: &AstNode,
    callee: &str,
    args: &[AstNode],
    builder: &mut FunctionBuilder,
    ctx: &LoweringContext,
    module: &IrModule,
) -> LowerResult<Register> {
    let resolved = ctx.resolve_function(callee, module).ok_or_else(|| {
        LoweringError::at(LoweringErrorKind::UnknownFunction { name: callee.to_string() }, expr)
    })?;
    let signature = resolved.signature().clone();

    if signature.arity() != args.len() {
        return Err(LoweringError::at(
            LoweringErrorKind::ArityMismatch {
                name: callee.to_string(),
                expected: signature.arity(),
                found: args.len(),
            },
            expr,
        ));
    }

    let mut regs = Vec::with_capacity(args.len());
    for arg in args.iter() {
        let r = lower_expr(arg, builder, ctx, module)?;
        expect_type(builder, r, &IrType::F64, arg)?;
        regs.push(r);
    }

    if let Resolved::Prototype(sig) = resolved {
        builder.queue_declaration(sig);
    }

    let dest = builder.alloc_reg(signature.ret.clone());
    builder.emit_op(IROp::Call { dest, callee: callee.to_string(), args: regs });
    Ok(dest)
}

fn lower_if(
    condition: &AstNode,
    then_branch: &AstNode,
    else_branch: &AstNode,
    builder: &mut FunctionBuilder,
    ctx: &LoweringContext,
    module: &IrModule,
) -> LowerResult<Register> {
    let cond = lower_expr(condition, builder, ctx, module)?;
    expect_type(builder, cond, &IrType::F64, condition)?;
    let test = builder.alloc_reg(IrType::Bool);
    builder.emit_op(IROp::Truthy { dest: test, src: cond });

    let then_bb = builder.append_block("then");
    let else_bb = builder.append_block("else");
    let merge_bb = builder.append_block("ifcont");
    builder.emit_op(IROp::Branch { cond: test, then_block: then_bb, else_block: else_bb });

    // Nested control flow may move the insertion point, so the phi edges come
    // from whichever block each branch ends in.
    builder.position_at_end(then_bb);
    let then_val = lower_expr(then_branch, builder, ctx, module)?;
    builder.emit_op(IROp::Jump { target: merge_bb });
    let then_end = builder.current_block();

    builder.position_at_end(else_bb);
    let else_val = lower_expr(else_branch, builder, ctx, module)?;
    let then_ty = builder.reg_type(then_val).clone();
    expect_type(builder, else_val, &then_ty, else_branch)?;
    builder.emit_op(IROp::Jump { target: merge_bb });
    let else_end = builder.current_block();

    builder.position_at_end(merge_bb);
    let dest = builder.alloc_reg(then_ty);
    builder.emit_op(IROp::Phi { dest, incoming: vec![(then_val, then_end), (else_val, else_end)] });
    Ok(dest)
}

#[allow(clippy::too_many_arguments)]
fn lower_for(
    var: &str,
    start: &AstNode,
    end: &AstNode,
    step: Option<&AstNode>,
    body: &AstNode,
    builder: &mut FunctionBuilder,
    ctx: &LoweringContext,
    module: &IrModule,
) -> LowerResult<Register> {
    let start_val = lower_expr(start, builder, ctx, module)?;
    expect_type(builder, start_val, &IrType::F64, start)?;

    let preheader = builder.current_block();
    let loop_bb = builder.append_block("loop");
    builder.emit_op(IROp::Jump { target: loop_bb });

    builder.position_at_end(loop_bb);
    let induction = builder.alloc_reg(IrType::F64);
    builder.emit_op(IROp::Phi { dest: induction, incoming: vec![(start_val, preheader)] });

    let shadowed = builder.bind(var, induction);

    // The body's value is discarded.
    lower_expr(body, builder, ctx, module)?;

    let step_val = match step {
        Some(step) => {
            let r = lower_expr(step, builder, ctx, module)?;
            expect_type(builder, r, &IrType::F64, step)?;
            r
        }
        None => builder.const_f64(1.0),
    };
    let next = builder.alloc_reg(IrType::F64);
    builder.emit_op(IROp::Add { dest: next, src1: induction, src2: step_val });

    let end_val = lower_expr(end, builder, ctx, module)?;
    expect_type(builder, end_val, &IrType::F64, end)?;
    let test = builder.alloc_reg(IrType::Bool);
    builder.emit_op(IROp::Truthy { dest: test, src: end_val });

    let loop_end = builder.current_block();
    let after_bb = builder.append_block("afterloop");
    builder.emit_op(IROp::Branch { cond: test, then_block: loop_bb, else_block: after_bb });
    builder.add_phi_incoming(loop_bb, induction, (next, loop_end));

    builder.position_at_end(after_bb);
    builder.restore(var, shadowed);

    Ok(builder.const_f64(0.0))
}
