//! file: core/src/ir/lower/lower_record.rs
//! description: record allocation and construction lowering.
//!
//! A record construction lowers its destination to a record pointer, then for
//! each field lowers the value, computes the field address with the two-level
//! index `[0, field]` (first record, field slot) and stores the value there.
//! The construction yields the destination pointer itself, so lowering two
//! constructions against the same destination writes the same addresses.
//!
use crate::ast::{AstNode, RecordField};
use crate::ir::module::IrModule;
use crate::ir::op::{IROp, Register};
use crate::ir::value::IrType;

use super::err::{LoweringError, LoweringErrorKind};
use super::function_builder::FunctionBuilder;
use super::lower_expr::{LowerResult, expect_type, lower_expr};
use super::lowering_context::LoweringContext;

pub(crate) fn lower_allocate(
    expr: &AstNode,
    record: &str,
    builder: &mut FunctionBuilder,
    module: &IrModule,
) -> LowerResult<Register> {
    if !module.records().contains(record) {
        return Err(LoweringError::at(
            LoweringErrorKind::AllocationFailure { reason: format!("no record layout named '{}'", record) },
            expr,
        ));
    }
    let dest = builder.alloc_reg(IrType::Ptr(record.to_string()));
    builder.emit_op(IROp::Alloca { dest, record: record.to_string() });
    Ok(dest)
}

pub(crate) fn lower_record_construct(
    expr: &AstNode,
    destination: &AstNode,
    fields: &[RecordField],
    builder: &mut FunctionBuilder,
    ctx: &LoweringContext,
    module: &IrModule,
) -> LowerResult<Register> {
    let base = lower_expr(destination, builder, ctx, module)?;

    let record = match builder.reg_type(base) {
        IrType::Ptr(record) => record.clone(),
        other => {
            return Err(LoweringError::at(
                LoweringErrorKind::AllocationFailure {
                    reason: format!("record destination has type {}, not a record pointer", other),
                },
                destination,
            ));
        }
    };
    let field_count = match module.records().get(&record) {
        Some(layout) => layout.field_count(),
        None => {
            return Err(LoweringError::at(
                LoweringErrorKind::AllocationFailure { reason: format!("no record layout named '{}'", record) },
                destination,
            ));
        }
    };

    for field in fields.iter() {
        if field.index >= field_count {
            return Err(LoweringError::at(
                LoweringErrorKind::AllocationFailure {
                    reason: format!("field {} is outside record '{}' ({} fields)", field.index, record, field_count),
                },
                expr,
            ));
        }

        let value = lower_expr(&field.value, builder, ctx, module)?;
        expect_type(builder, value, &IrType::F64, &field.value)?;

        let addr = builder.alloc_reg(IrType::Ptr(record.clone()));
        builder.emit_op(IROp::FieldAddr { dest: addr, base, indices: [0, field.index] });
        builder.emit_op(IROp::Store { src: value, addr });
    }

    Ok(base)
}
