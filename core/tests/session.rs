use posec_core::config::{CompilerConfig, RecordSpec};
use posec_core::{CompilationContext, Evaluated, ItemOutcome, Level, PosecErrorExt, generate_error_report};

fn numbers(values: Vec<&Evaluated>) -> Vec<f64> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Evaluated::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

#[test]
fn items_are_reported_in_order() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "extern sin(x); def sq(x) x * x; sq(3) + 1;");

    assert_eq!(report.items.len(), 3);
    assert!(matches!(&report.items[0].result, Ok(ItemOutcome::Declared { name }) if name == "sin"));
    assert!(matches!(&report.items[1].result, Ok(ItemOutcome::Defined { name }) if name == "sq"));
    assert_eq!(numbers(report.values()), vec![10.0]);
    assert!(!report.has_failures());
    assert_eq!(report.items[1].summary, "def sq(x)");
}

#[test]
fn top_level_expressions_do_not_stay_in_the_module() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "1 + 2; 3 * 4");
    assert_eq!(numbers(report.values()), vec![3.0, 12.0]);
    assert!(session.module().is_empty());
    assert!(session.context().prototype("anon_expr").is_none());
}

#[test]
fn syntax_error_does_not_block_later_items() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "def broken(a, b) a; def ok(x) x + 1; ok(1)");

    assert_eq!(report.items.len(), 3);
    let err = report.items[0].result.as_ref().expect_err("first item fails");
    assert!(err.message().contains("expected ')' in prototype"));
    assert!(report.items[0].item.is_none());
    assert!(matches!(&report.items[1].result, Ok(ItemOutcome::Defined { .. })));
    assert_eq!(numbers(report.values()), vec![2.0]);
}

#[test]
fn recovery_skips_a_token_when_nothing_was_consumed() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", ") def one() 1; one()");

    assert_eq!(report.failures().count(), 1);
    assert!(session.module().contains("one"));
    assert_eq!(numbers(report.values()), vec![1.0]);
}

#[test]
fn lowering_failure_is_reported_and_module_kept() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "def f(x) g(x); def h(x) x; h(5)");

    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.index, 0);
    let err = failure.result.as_ref().expect_err("failed");
    assert_eq!(err.level(), Level::Error);
    assert!(err.message().contains("unknown function 'g'"));
    assert_eq!(err.issuer(), "posec.ir.lower");
    assert_eq!(session.module().function_names(), vec!["h"]);
    assert_eq!(numbers(report.values()), vec![5.0]);
}

#[test]
fn redefinition_is_a_reported_failure() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "def f() 1; def f() 2; f()");
    assert_eq!(report.failures().count(), 1);
    assert_eq!(numbers(report.values()), vec![1.0]);
}

#[test]
fn printd_output_is_collected() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "extern printd(x); printd(7); printd(8)");
    assert_eq!(report.output, "7\n8\n");
}

#[test]
fn record_values_are_materialized() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "Pose2D(1, 2, 3)");
    assert_eq!(report.values()[0].to_string(), "Pose2D { 1, 2, 3 }");
}

#[test]
fn evaluation_can_be_turned_off() {
    let config = CompilerConfig { evaluate_top_level: false, ..CompilerConfig::default() };
    let mut session = CompilationContext::new(config);
    let report = session.compile_source("s.pk", "extern printd(x); printd(1)");
    assert!(matches!(&report.items[1].result, Ok(ItemOutcome::Lowered { function }) if function.name() == "anon_expr"));
    assert!(report.output.is_empty());
    assert!(!session.module().contains("anon_expr"));
}

#[test]
fn runtime_failure_is_an_item_failure() {
    let config = CompilerConfig { max_steps: 100, ..CompilerConfig::default() };
    let mut session = CompilationContext::new(config);
    let report = session.compile_source("s.pk", "for i = 0, 1 in i; 2");
    assert_eq!(report.failures().count(), 1);
    assert_eq!(numbers(report.values()), vec![2.0]);
}

#[test]
fn malformed_number_fails_only_its_own_item() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "def ok() 1; 1.2.3; ok(); def two() 1..2; ok() + 1");

    assert_eq!(report.items.len(), 5);
    assert!(matches!(&report.items[0].result, Ok(ItemOutcome::Defined { name }) if name == "ok"));
    let err = report.items[1].result.as_ref().expect_err("bad literal");
    assert!(err.message().contains("malformed number literal '1.2.3'"));
    assert!(report.items[3].result.is_err());
    assert!(!session.module().contains("two"));
    assert_eq!(numbers(report.values()), vec![1.0, 2.0]);
}

#[test]
fn configured_records_and_operators_are_used() {
    let mut config = CompilerConfig::default();
    config.records.push(RecordSpec { name: "Vec3".to_string(), fields: vec!["x".into(), "y".into(), "z".into()] });
    config.operators.insert("+".to_string(), 50);
    config.validate().expect("valid config");

    let mut session = CompilationContext::new(config);
    let report = session.compile_source("s.pk", "Vec3(1, 2, 3); 2 + 3 * 4");
    let values = report.values();
    assert_eq!(values[0], &Evaluated::Record { name: "Vec3".to_string(), fields: vec![1.0, 2.0, 3.0] });
    assert_eq!(values[1], &Evaluated::Number(20.0));
}

#[test]
fn unknown_operator_from_config_is_unsupported_in_lowering() {
    let mut config = CompilerConfig::default();
    config.operators.insert("%".to_string(), 40);
    let mut session = CompilationContext::new(config);
    let report = session.compile_source("s.pk", "def m(a b) a % b");
    let err = report.items[0].result.as_ref().expect_err("unsupported");
    assert!(err.message().contains("unsupported binary operator '%'"));
}

#[test]
fn error_report_line_format() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "if x 1 else 2");
    let err = report.items[0].result.as_ref().expect_err("syntax error");
    let line = generate_error_report(&**err);
    assert!(line.starts_with("POSEC | ERROR | s.pk:1:6 | expected 'then'"), "{}", line);
}

#[test]
fn anon_expr_cannot_be_declared_by_the_user() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "extern anon_expr(); def anon_expr() 5; 1 + 1; 2 + 2");

    assert_eq!(report.items.len(), 4);
    for item in &report.items[..2] {
        let err = item.result.as_ref().expect_err("reserved name");
        assert!(err.message().contains("'anon_expr' is reserved"), "{}", err.message());
    }
    assert_eq!(numbers(report.values()), vec![2.0, 4.0]);
    assert!(session.module().is_empty());
}

#[test]
fn extern_and_definition_must_agree_on_return_type() {
    let mut session = CompilationContext::new(CompilerConfig::default());
    let report = session.compile_source("s.pk", "extern g(); def h() g() + 1; def g() Pose2D(1, 2, 3); h()");

    let failures = report.failures().map(|r| r.index).collect::<Vec<_>>();
    assert_eq!(failures, vec![2, 3]);
    let err = report.items[2].result.as_ref().expect_err("return type");
    assert!(err.message().contains("type mismatch: expected f64, found ptr<Pose2D>"));
    assert!(report.items[3].result.as_ref().expect_err("no body").message().contains("no host implementation"));
}
