//! file: core/src/ir/lower/mod.rs
//! description: AST -> IR lowering entry points.
//!
//! `lower_prototype` declares a function signature; `lower_function` builds a
//! full body. A function is built in a detached `FunctionBuilder`, verified,
//! and only then committed to the module together with the declarations its
//! calls need. A failed lowering leaves the module exactly as it was.
//!
//! Callers that resolve a function through a declaration or a prototype
//! assume it returns `f64`. A definition whose body yields another type is
//! rejected when an earlier declaration or its own recursive call already
//! relied on that assumption, so functions returning a record cannot recurse.

pub mod err;
pub mod function_builder;
pub mod lower_expr;
pub mod lower_record;
pub mod lowering_context;

use log::debug;

use crate::ast::{Function, Prototype};
use crate::ir::module::{IrFunction, IrModule, IrSignature};
use crate::ir::op::IROp;
use crate::ir::value::IrType;
use crate::ir::verify;

pub use err::{LoweringError, LoweringErrorKind};
pub use function_builder::FunctionBuilder;
pub use lower_expr::lower_expr;
pub use lowering_context::{LoweringContext, Resolved};

/// Reject `proto` if it conflicts with what the module already holds.
fn check_existing(proto: &Prototype, module: &IrModule, item: &'static str, defining: bool) -> Result<(), LoweringError> {
    if let Some(existing) = module.get_function(&proto.name) {
        if defining && !existing.is_declaration() {
            return Err(LoweringError::for_item(
                LoweringErrorKind::Redefinition { name: proto.name.clone() },
                item,
                proto.location.clone(),
            ));
        }
        if existing.arity() != proto.arity() {
            return Err(LoweringError::for_item(
                LoweringErrorKind::ArityMismatch {
                    name: proto.name.clone(),
                    expected: existing.arity(),
                    found: proto.arity(),
                },
                item,
                proto.location.clone(),
            ));
        }
    }
    Ok(())
}

/// Declare `proto` in the module (or reuse a matching declaration) and record
/// it in the symbol table.
pub fn lower_prototype(
    proto: &Prototype,
    ctx: &mut LoweringContext,
    module: &mut IrModule,
) -> Result<IrSignature, LoweringError> {
    check_existing(proto, module, "Prototype", false)?;

    ctx.register_prototype(proto);
    let signature = match module.get_function(&proto.name) {
        Some(existing) => existing.signature.clone(),
        None => {
            let sig = IrSignature::external(&proto.name, &proto.params);
            module.declare_function(sig.clone());
            debug!("declared {}", proto);
            sig
        }
    };
    Ok(signature)
}

/// Lower a function definition into the module and return the committed
/// function.
pub fn lower_function<'m>(
    func: &Function,
    ctx: &mut LoweringContext,
    module: &'m mut IrModule,
) -> Result<&'m IrFunction, LoweringError> {
    let proto = &func.proto;
    check_existing(proto, module, "Function", true).map_err(|e| e.in_function(&proto.name))?;

    // Visible to the body so recursive calls resolve; rolled back on failure.
    let previous = ctx.prototype(&proto.name).cloned();
    ctx.register_prototype(proto);

    let built = build_function(func, ctx, module);
    let (function, declarations) = match built {
        Ok(parts) => parts,
        Err(e) => {
            match previous {
                Some(p) => ctx.register_prototype(&p),
                None => {
                    ctx.forget_prototype(&proto.name);
                }
            }
            return Err(e.in_function(&proto.name));
        }
    };

    for decl in declarations {
        if decl.name != proto.name && module.declare_function(decl.clone()) {
            debug!("declared {} on first use", decl.name);
        }
    }
    debug!("defined {} ({} blocks)", proto.name, function.blocks.len());
    module.define_function(function);

    module.get_function(&proto.name).ok_or_else(|| {
        LoweringError::for_item(
            LoweringErrorKind::InvalidFunction { reason: "function vanished after commit".to_string() },
            "Function",
            proto.location.clone(),
        )
    })
}

fn build_function(
    func: &Function,
    ctx: &LoweringContext,
    module: &IrModule,
) -> Result<(IrFunction, Vec<IrSignature>), LoweringError> {
    let proto = &func.proto;
    let mut builder = FunctionBuilder::new(&proto.name);

    // Parameters take registers 0..n; a repeated name binds its last slot.
    for param in proto.params.iter() {
        let reg = builder.alloc_reg(IrType::F64);
        builder.bind(param, reg);
    }

    let result = lower_expr(&func.body, &mut builder, ctx, module)?;
    builder.emit_op(IROp::Ret { src: result });

    let signature = IrSignature {
        name: proto.name.clone(),
        params: proto.params.clone(),
        ret: builder.reg_type(result).clone(),
    };
    let (function, declarations) = builder.finish(signature);

    let assumed = match module.get_function(&proto.name) {
        Some(existing) => Some(existing.signature.ret.clone()),
        None if declarations.iter().any(|d| d.name == proto.name) => Some(IrType::F64),
        None => None,
    };
    if let Some(expected) = assumed {
        if expected != function.signature.ret {
            return Err(LoweringError::for_item(
                LoweringErrorKind::TypeMismatch { expected, found: function.signature.ret.clone() },
                "Function",
                proto.location.clone(),
            ));
        }
    }

    verify::verify_function(&function).map_err(|reason| {
        LoweringError::for_item(LoweringErrorKind::InvalidFunction { reason }, "Function", proto.location.clone())
    })?;

    Ok((function, declarations))
}
