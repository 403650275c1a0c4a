use posec_core::ast::{
    AstNodeKind, Item, OperatorTable, Parser, SyntaxError, Token, TokenKind, parse_expression_str, parse_items,
    tokenize,
};
use posec_core::layout::RecordRegistry;

fn parse(src: &str) -> posec_core::AstNode {
    parse_expression_str(src).expect("expression should parse")
}

fn parse_err(src: &str) -> SyntaxError {
    parse_expression_str(src).expect_err("expression should not parse")
}

fn items(src: &str) -> Result<Vec<Item>, SyntaxError> {
    let tokens = tokenize("test.pk", src);
    parse_items(&tokens, &OperatorTable::standard(), &RecordRegistry::with_builtins())
}

#[test]
fn lexer_classifies_keywords_operators_and_numbers() {
    let tokens = tokenize("t.pk", "def f(x) # comment\n  x * 2.5");
    let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Def,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::Identifier,
            TokenKind::Operator,
            TokenKind::Number,
            TokenKind::EndOfStream,
        ]
    );
    assert_eq!(tokens[7].numeric_value, Some(2.5));
    assert!(tokens[6].is_operator('*'));

    let loc = tokens[5].location.clone().expect("location");
    assert_eq!((loc.line, loc.column), (2, 3));
}

#[test]
fn malformed_number_is_a_parse_error() {
    let tokens = tokenize("t.pk", "1.2.3 + 1");
    assert_eq!(tokens[0].kind, TokenKind::Invalid);
    assert_eq!(tokens[0].text.as_deref(), Some("1.2.3"));
    assert!(tokens[1].is_operator('+'));

    let err = parse_err("1.2.3 + 1");
    assert!(err.text().contains("malformed number literal '1.2.3'"));
}

#[test]
fn higher_precedence_binds_tighter() {
    assert_eq!(parse("a + b * c").to_string(), "(+ a (* b c))");
    assert_eq!(parse("a * b + c").to_string(), "(+ (* a b) c)");
    assert_eq!(parse("a < b + c").to_string(), "(< a (+ b c))");
}

#[test]
fn equal_precedence_is_left_associative() {
    assert_eq!(parse("a - b - c").to_string(), "(- (- a b) c)");
    assert_eq!(parse("a / b * c").to_string(), "(* (/ a b) c)");
}

#[test]
fn parentheses_override_precedence_and_are_transparent() {
    assert_eq!(parse("(a + b) * c").to_string(), "(* (+ a b) c)");
    let node = parse("((1))");
    assert!(matches!(node.kind, AstNodeKind::Number { value } if value == 1.0));
}

#[test]
fn unknown_operator_ends_the_expression() {
    let tokens = tokenize("t.pk", "a % b");
    let operators = OperatorTable::standard();
    let records = RecordRegistry::with_builtins();
    let mut parser = Parser::new(&tokens, &operators, &records);
    let node = parser.parse_expression().expect("parse");
    assert_eq!(node.to_string(), "a");
    assert!(parser.current().is_operator('%'));
}

#[test]
fn custom_operator_table_changes_grouping() {
    let tokens = tokenize("t.pk", "a + b * c");
    let mut operators = OperatorTable::standard();
    operators.insert('+', 50);
    let records = RecordRegistry::with_builtins();
    let mut parser = Parser::new(&tokens, &operators, &records);
    assert_eq!(parser.parse_expression().expect("parse").to_string(), "(* (+ a b) c)");
}

#[test]
fn call_collects_arguments_in_order() {
    let node = parse("f(a, b + 1, c)");
    let AstNodeKind::Call { callee, args } = &node.kind else {
        panic!("expected a call, got {}", node);
    };
    assert_eq!(callee, "f");
    assert_eq!(args.len(), 3);
    assert_eq!(args[0].to_string(), "a");
    assert_eq!(args[1].to_string(), "(+ b 1)");
    assert_eq!(args[2].to_string(), "c");

    assert_eq!(parse("g()").to_string(), "(call g)");
}

#[test]
fn call_without_separator_is_rejected() {
    let err = parse_err("f(a b)");
    assert_eq!(err.text(), "expected ')' or ',' in argument list");
    assert_eq!(err.token().map(|t| t.kind), Some(TokenKind::Identifier));
}

#[test]
fn if_expression_has_three_branches() {
    let node = parse("if x then 1 else 2");
    assert!(matches!(node.kind, AstNodeKind::If { .. }));
    assert_eq!(node.to_string(), "(if x 1 2)");
}

#[test]
fn if_requires_then_keyword() {
    assert_eq!(parse_err("if x 1 else 2").text(), "expected 'then'");
    assert_eq!(parse_err("if x then 1 2").text(), "expected 'else'");
}

#[test]
fn for_with_and_without_step() {
    let with_step = parse("for i = 0, i < 10, 2 in f(i)");
    let AstNodeKind::For { var, step, .. } = &with_step.kind else {
        panic!("expected a for loop");
    };
    assert_eq!(var, "i");
    assert_eq!(step.as_ref().map(|s| s.to_string()), Some("2".to_string()));

    let without_step = parse("for i = 0, i < 10 in f(i)");
    assert!(matches!(&without_step.kind, AstNodeKind::For { step: None, .. }));
    assert_eq!(without_step.to_string(), "(for i 0 (< i 10) (call f i))");
}

#[test]
fn for_reports_each_missing_piece() {
    assert_eq!(parse_err("for 1 = 0, 1 in x").text(), "expected identifier after 'for'");
    assert_eq!(parse_err("for i 0, 1 in x").text(), "expected '=' after 'for'");
    assert_eq!(parse_err("for i = 0 1 in x").text(), "expected ',' after 'for' start value");
    assert_eq!(parse_err("for i = 0, 1 x").text(), "expected 'in' after 'for'");
}

#[test]
fn unexpected_token_in_primary_position() {
    let err = parse_err(")");
    assert_eq!(err.text(), "unknown token when expecting an expression");
    assert_eq!(parse_err("(1").text(), "expected ')'");
}

#[test]
fn prototype_parameters_are_whitespace_separated() {
    let parsed = items("def f(a b c) a + b + c").expect("parse");
    let Item::Definition(func) = &parsed[0] else {
        panic!("expected a definition");
    };
    assert_eq!(func.proto.params, vec!["a", "b", "c"]);
    assert_eq!(func.body.to_string(), "(+ (+ a b) c)");

    let err = items("def f(a, b) a").expect_err("comma-separated parameters");
    assert_eq!(err.text(), "expected ')' in prototype");
}

#[test]
fn prototype_errors() {
    assert_eq!(items("def (x) x").expect_err("no name").text(), "expected function name in prototype");
    assert_eq!(items("extern sin x").expect_err("no paren").text(), "expected '(' in prototype");
}

#[test]
fn items_dispatch_on_leading_keyword() {
    let parsed = items("extern sin(x); def two() 2; two() + 1").expect("parse");
    assert_eq!(parsed.len(), 3);
    assert!(matches!(&parsed[0], Item::Extern(p) if p.name == "sin" && p.arity() == 1));
    assert!(matches!(&parsed[1], Item::Definition(f) if f.proto.name == "two"));
    let Item::Expression(anon) = &parsed[2] else {
        panic!("expected a top-level expression");
    };
    assert_eq!(anon.proto.name, "anon_expr");
    assert!(anon.proto.params.is_empty());
    assert_eq!(anon.body.to_string(), "(+ (call two) 1)");
}

#[test]
fn record_name_call_becomes_record_construction() {
    let node = parse("Pose2D(x, y + 1, 0.5)");
    assert_eq!(node.to_string(), "(record (alloc Pose2D) [0]=x [1]=(+ y 1) [2]=0.5)");
    let AstNodeKind::RecordConstruct { destination, fields } = &node.kind else {
        panic!("expected record construction");
    };
    assert!(matches!(&destination.kind, AstNodeKind::Allocate { record } if record == "Pose2D"));
    assert_eq!(fields.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn record_construction_checks_field_count() {
    let err = parse_err("Pose2D(1, 2)");
    assert!(err.text().contains("3 field(s) but 2 value(s)"), "{}", err);
}

#[test]
fn reading_past_the_end_yields_end_of_stream() {
    let tokens = vec![Token::number(1.0)];
    let operators = OperatorTable::standard();
    let records = RecordRegistry::new();
    let mut parser = Parser::new(&tokens, &operators, &records);
    assert!(parser.parse_expression().is_ok());
    assert!(parser.is_at_end());
    parser.advance();
    assert_eq!(parser.position(), 1);
    assert_eq!(parser.current().kind, TokenKind::EndOfStream);
}

#[test]
fn structural_equality_ignores_ids() {
    let a = parse("f(1, x)");
    let b = parse("f(1, x)");
    assert_ne!(a.get_id(), b.get_id());
    assert_eq!(a, b);
}
