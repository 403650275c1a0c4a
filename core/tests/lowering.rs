use posec_core::ast::{AstNode, AstNodeKind, Function, Item, OperatorTable, Prototype, RecordField, parse_items, tokenize};
use posec_core::ir::lower::{FunctionBuilder, LoweringContext, LoweringErrorKind, lower_expr, lower_function, lower_prototype};
use posec_core::ir::{IROp, IrModule, IrSignature, IrType, Machine, verify_function};
use posec_core::layout::RecordRegistry;

fn parse_with(src: &str, operators: &OperatorTable) -> Vec<Item> {
    let tokens = tokenize("lowering.pk", src);
    parse_items(&tokens, operators, &RecordRegistry::with_builtins()).expect("parse")
}

fn new_module() -> IrModule {
    IrModule::new(RecordRegistry::with_builtins())
}

/// Lower every item of `src`, stopping at the first lowering error.
fn lower_all(src: &str, ctx: &mut LoweringContext, module: &mut IrModule) -> Result<(), LoweringErrorKind> {
    for item in parse_with(src, &OperatorTable::standard()) {
        match item {
            Item::Extern(proto) => {
                lower_prototype(&proto, ctx, module).map_err(|e| e.kind().clone())?;
            }
            Item::Definition(func) | Item::Expression(func) => {
                lower_function(&func, ctx, module).map_err(|e| e.kind().clone())?;
            }
        }
    }
    Ok(())
}

#[test]
fn definition_is_committed_with_params_in_leading_registers() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def add(a b) a + b", &mut ctx, &mut module).expect("lower");

    let add = module.get_function("add").expect("add defined");
    assert_eq!(add.arity(), 2);
    assert_eq!(add.signature.ret, IrType::F64);
    assert_eq!(add.reg_types[0], IrType::F64);
    assert!(matches!(add.ops().next(), Some(IROp::Add { src1: 0, src2: 1, .. })));
    assert!(matches!(add.ops().last(), Some(IROp::Ret { .. })));
    assert!(ctx.prototype("add").is_some());
}

#[test]
fn unknown_function_leaves_module_unchanged() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("extern sin(x)", &mut ctx, &mut module).expect("extern");
    let before = module.function_names().iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let err = lower_all("def g(x) sin(x) + missing(x)", &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::UnknownFunction { name: "missing".to_string() });
    assert_eq!(module.function_names(), before);
    assert!(ctx.prototype("g").is_none());
}

#[test]
fn call_arity_is_checked_against_the_signature() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("extern atan2(y x); def h() atan2(1)", &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::ArityMismatch { name: "atan2".to_string(), expected: 2, found: 1 });
}

#[test]
fn definition_must_match_earlier_extern_arity() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("extern f(a); def f(a b) a", &mut ctx, &mut module).expect_err("should fail");
    assert!(matches!(err, LoweringErrorKind::ArityMismatch { expected: 1, found: 2, .. }));
}

#[test]
fn redefinition_is_rejected() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("def f(x) x; def f(x) x + 1", &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::Redefinition { name: "f".to_string() });
    assert_eq!(module.len(), 1);
}

#[test]
fn extern_then_definition_fills_in_the_body() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("extern f(a); def f(a) a * 2", &mut ctx, &mut module).expect("lower");
    assert_eq!(module.len(), 1);
    assert!(!module.get_function("f").expect("f").is_declaration());
}

#[test]
fn unbound_variable() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("def f(x) y", &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::UnboundVariable { name: "y".to_string() });
    assert!(module.is_empty());
}

#[test]
fn operator_without_lowering_is_unsupported() {
    let mut operators = OperatorTable::standard();
    operators.insert('%', 40);
    let items = parse_with("def f(a b) a % b", &operators);
    let Item::Definition(func) = &items[0] else {
        panic!("expected a definition");
    };

    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_function(func, &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err.kind(), &LoweringErrorKind::UnsupportedOperator { op: '%' });
    assert_eq!(err.node(), "BinaryOp");
    assert_eq!(err.function(), Some("f"));
}

#[test]
fn record_pointer_is_not_a_number() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("def p() Pose2D(1, 2, 3); def q() p() + 1", &mut ctx, &mut module).expect_err("should fail");
    assert!(matches!(err, LoweringErrorKind::TypeMismatch { expected: IrType::F64, .. }));
    assert_eq!(module.get_function("p").map(|f| f.signature.ret.clone()), Some(IrType::Ptr("Pose2D".to_string())));
}

#[test]
fn unknown_record_layout_fails_allocation() {
    let body = AstNode::new(
        AstNodeKind::RecordConstruct {
            destination: Box::new(AstNode::new(AstNodeKind::Allocate { record: "Pose3D".to_string() }, None)),
            fields: vec![RecordField { index: 0, value: AstNode::number(1.0) }],
        },
        None,
    );
    let func = Function { proto: Prototype::new("make", Vec::new()), body };

    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_function(&func, &mut ctx, &mut module).expect_err("should fail");
    assert!(matches!(err.kind(), LoweringErrorKind::AllocationFailure { .. }));
    assert!(module.is_empty());
}

#[test]
fn record_destination_must_be_a_pointer() {
    let body = AstNode::new(
        AstNodeKind::RecordConstruct {
            destination: Box::new(AstNode::number(3.0)),
            fields: vec![RecordField { index: 0, value: AstNode::number(1.0) }],
        },
        None,
    );
    let func = Function { proto: Prototype::new("make", Vec::new()), body };

    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_function(&func, &mut ctx, &mut module).expect_err("should fail");
    assert!(matches!(err.kind(), LoweringErrorKind::AllocationFailure { .. }));
}

#[test]
fn record_field_index_must_be_inside_the_layout() {
    let body = AstNode::new(
        AstNodeKind::RecordConstruct {
            destination: Box::new(AstNode::new(AstNodeKind::Allocate { record: "Pose2D".to_string() }, None)),
            fields: vec![RecordField { index: 3, value: AstNode::number(1.0) }],
        },
        None,
    );
    let func = Function { proto: Prototype::new("make", Vec::new()), body };

    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_function(&func, &mut ctx, &mut module).expect_err("should fail");
    assert!(matches!(err.kind(), LoweringErrorKind::AllocationFailure { reason } if reason.contains("field 3")));
}

fn construct_into(dest: &str, values: [f64; 3]) -> AstNode {
    let fields = values
        .iter()
        .enumerate()
        .map(|(index, v)| RecordField { index, value: AstNode::number(*v) })
        .collect();
    AstNode::new(AstNodeKind::RecordConstruct { destination: Box::new(AstNode::variable(dest)), fields }, None)
}

#[test]
fn record_fields_are_stored_at_base_plus_index_and_overwritten() {
    let mut module = new_module();
    let ctx = LoweringContext::new();
    let mut builder = FunctionBuilder::new("fill");

    let pose = IrType::Ptr("Pose2D".to_string());
    let p = builder.alloc_reg(pose.clone());
    builder.emit_op(IROp::Alloca { dest: p, record: "Pose2D".to_string() });
    builder.bind("p", p);

    let first = lower_expr(&construct_into("p", [1.0, 2.0, 3.0]), &mut builder, &ctx, &module).expect("first");
    let second = lower_expr(&construct_into("p", [4.0, 5.0, 6.0]), &mut builder, &ctx, &module).expect("second");
    assert_eq!(first, p);
    assert_eq!(second, p);

    let addresses = builder
        .block(0)
        .ops
        .iter()
        .filter_map(|op| match op {
            IROp::FieldAddr { base, indices, .. } => Some((*base, *indices)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(addresses, vec![(p, [0, 0]), (p, [0, 1]), (p, [0, 2]), (p, [0, 0]), (p, [0, 1]), (p, [0, 2])]);

    builder.emit_op(IROp::Ret { src: p });
    let signature = IrSignature { name: "fill".to_string(), params: Vec::new(), ret: pose };
    let (function, decls) = builder.finish(signature);
    assert!(decls.is_empty());
    verify_function(&function).expect("valid");
    module.define_function(function);

    let mut machine = Machine::new(&module, 1000);
    let ptr = machine.call("fill", &[]).expect("run");
    assert_eq!(machine.record(ptr), Some(&[4.0, 5.0, 6.0][..]));
    assert_eq!(machine.allocation_count(), 1);
}

#[test]
fn if_lowers_to_branch_and_phi() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def pick(x) if x then 1 else 2", &mut ctx, &mut module).expect("lower");

    let pick = module.get_function("pick").expect("pick");
    let labels = pick.blocks.iter().map(|b| b.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["entry", "then", "else", "ifcont"]);
    assert!(matches!(pick.blocks[0].terminator(), Some(IROp::Branch { then_block: 1, else_block: 2, .. })));
    assert!(matches!(&pick.blocks[3].ops[0], IROp::Phi { incoming, .. } if incoming.len() == 2));
}

#[test]
fn nested_ifs_get_unique_block_labels() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def f(a b) if a then (if b then 1 else 2) else 3", &mut ctx, &mut module).expect("lower");
    let f = module.get_function("f").expect("f");
    let labels = f.blocks.iter().map(|b| b.label.clone()).collect::<Vec<_>>();
    assert!(labels.contains(&"then1".to_string()));
    assert!(labels.contains(&"ifcont1".to_string()));
}

#[test]
fn for_loop_header_phi_has_two_edges() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def loop(n) for i = 0, i < n in i", &mut ctx, &mut module).expect("lower");
    let f = module.get_function("loop").expect("loop");

    let header = f.blocks.iter().position(|b| b.label == "loop").expect("loop block");
    let IROp::Phi { incoming, .. } = &f.blocks[header].ops[0] else {
        panic!("loop block must start with a phi");
    };
    assert_eq!(incoming.len(), 2);
    assert_eq!(incoming[0].1, 0);
    assert!(f.blocks.iter().any(|b| b.label == "afterloop"));
}

#[test]
fn loop_variable_shadowing_is_undone_after_the_loop() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def f(i) (for i = 0, i < 3 in i) + i", &mut ctx, &mut module).expect("lower");
    let f = module.get_function("f").expect("f");
    let IROp::Add { src2, .. } = f.ops().filter(|op| matches!(op, IROp::Add { .. })).last().expect("add") else {
        unreachable!();
    };
    assert_eq!(*src2, 0);
}

#[test]
fn prototype_only_callee_is_declared_on_first_use() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    ctx.register_prototype(&Prototype::new("cos", vec!["x".to_string()]));
    assert!(!module.contains("cos"));

    lower_all("def c(t) cos(t) * 2", &mut ctx, &mut module).expect("lower");
    assert!(module.get_function("cos").map(|f| f.is_declaration()).unwrap_or(false));
    assert_eq!(module.function_names(), vec!["cos", "c"]);
}

#[test]
fn recursive_definition_resolves_itself() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    lower_all("def fib(n) if n < 2 then n else fib(n - 1) + fib(n - 2)", &mut ctx, &mut module).expect("lower");
    assert_eq!(module.function_names(), vec!["fib"]);
}

#[test]
fn definition_must_keep_the_return_type_of_its_extern() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("extern g(); def h() g() + 1; def g() Pose2D(1, 2, 3)", &mut ctx, &mut module)
        .expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::TypeMismatch { expected: IrType::F64, found: IrType::Ptr("Pose2D".to_string()) });
    assert!(module.get_function("g").map(|f| f.is_declaration()).unwrap_or(false));
    assert_eq!(ctx.prototype("g").map(|p| p.arity()), Some(0));
}

#[test]
fn record_returning_function_cannot_recurse() {
    let mut ctx = LoweringContext::new();
    let mut module = new_module();
    let err = lower_all("def g(n) Pose2D(g(n - 1), 0, 0)", &mut ctx, &mut module).expect_err("should fail");
    assert_eq!(err, LoweringErrorKind::TypeMismatch { expected: IrType::F64, found: IrType::Ptr("Pose2D".to_string()) });
    assert!(module.is_empty());
    assert!(ctx.prototype("g").is_none());

    let err = lower_all("def f(n) if n < 1 then Pose2D(1, 2, 3) else f(n - 1)", &mut ctx, &mut module)
        .expect_err("should fail");
    assert!(matches!(err, LoweringErrorKind::TypeMismatch { .. }));
    assert!(ctx.prototype("f").is_none());
}

#[test]
fn verifier_rejects_malformed_bodies() {
    let mut builder = FunctionBuilder::new("broken");
    let r = builder.const_f64(1.0);
    let signature = IrSignature { name: "broken".to_string(), params: Vec::new(), ret: IrType::F64 };
    let (unterminated, _) = builder.finish(signature.clone());
    assert!(verify_function(&unterminated).expect_err("no terminator").contains("terminator"));

    let mut builder = FunctionBuilder::new("broken");
    let r2 = builder.const_f64(1.0);
    let other = builder.append_block("other");
    let phi = builder.alloc_reg(IrType::F64);
    builder.emit_op(IROp::Jump { target: other });
    builder.position_at_end(other);
    builder.emit_op(IROp::Phi { dest: phi, incoming: vec![(r2, other)] });
    builder.emit_op(IROp::Ret { src: phi });
    let (bad_phi, _) = builder.finish(signature);
    assert!(verify_function(&bad_phi).expect_err("bad phi").contains("not a predecessor"));
    assert_eq!(r, 0);
}
