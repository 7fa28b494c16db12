use super::*;

fn var(name: &str) -> Expr {
    Expr::Atom(Atom::Variable(name.to_owned()))
}

fn num(v: f64) -> Expr {
    Expr::Atom(Atom::Number(v))
}

fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let e = parse_expr("1 + 2 * 3").unwrap();
    assert_eq!(
        e,
        bin(BinaryOp::Add, num(1.0), bin(BinaryOp::Mul, num(2.0), num(3.0)))
    );
}

#[test]
fn same_level_operators_are_left_associative() {
    let e = parse_expr("a.x - b.y - 1").unwrap();
    assert_eq!(
        e,
        bin(
            BinaryOp::Sub,
            bin(BinaryOp::Sub, var("a.x"), var("b.y")),
            num(1.0)
        )
    );

    let e = parse_expr("a.x / 2 % 3").unwrap();
    assert_eq!(
        e,
        bin(BinaryOp::Mod, bin(BinaryOp::Div, var("a.x"), num(2.0)), num(3.0))
    );
}

#[test]
fn unary_minus_binds_tightest() {
    let e = parse_expr("-a.x * 2").unwrap();
    assert_eq!(
        e,
        bin(
            BinaryOp::Mul,
            Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(var("a.x")),
            },
            num(2.0)
        )
    );
}

#[test]
fn comparison_binds_loosest() {
    let e = parse_expr("a.x + 1 == 2").unwrap();
    assert_eq!(
        e,
        bin(BinaryOp::Eq, bin(BinaryOp::Add, var("a.x"), num(1.0)), num(2.0))
    );
}

#[test]
fn brackets_are_kept_in_the_tree() {
    let e = parse_expr("(1 + 2) * 3").unwrap();
    assert_eq!(
        e,
        bin(
            BinaryOp::Mul,
            Expr::Brackets(Box::new(bin(BinaryOp::Add, num(1.0), num(2.0)))),
            num(3.0)
        )
    );
}

#[test]
fn parses_calls() {
    let e = parse_expr("min(a.x, 5)").unwrap();
    assert_eq!(
        e,
        Expr::Call {
            func: "min".to_owned(),
            args: vec![var("a.x"), num(5.0)],
        }
    );
}

#[test]
fn call_requires_an_argument() {
    assert!(parse_expr("sin()").is_err());
}

#[test]
fn parses_program_of_sentences() {
    let p = parse_program("a.x = 1;\n.O[0] = .I[0] * 2;\n").unwrap();
    assert_eq!(p.segments.len(), 2);
    match &p.segments[1] {
        Segment::Sentence(s) => {
            assert_eq!(s.target, ".O[0]");
            assert_eq!(s.value, bin(BinaryOp::Mul, var(".I[0]"), num(2.0)));
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

#[test]
fn parses_condition_segment() {
    let p = parse_program("if (a.x == 1) { b.y = 2; b.z = 3; } else { b.y = 0 }\n").unwrap();
    assert_eq!(p.segments.len(), 1);
    match &p.segments[0] {
        Segment::Condition(c) => {
            assert_eq!(c.then_block.len(), 2);
            assert_eq!(c.else_block.len(), 1);
            assert!(matches!(c.test, Expr::Brackets(_)));
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

#[test]
fn empty_program_has_no_segments() {
    let p = parse_program("// nothing to do\n").unwrap();
    assert!(p.segments.is_empty());
}

#[test]
fn missing_semicolon_reports_remainder() {
    let err = parse_program("a.x = 1\nb.y = 2;\n").unwrap_err();
    assert_eq!(err.offset, 8);
    assert!(err.remainder.starts_with("b.y = 2;"));
}

#[test]
fn assignment_target_must_be_a_variable() {
    let err = parse_program("x = 1;\n").unwrap_err();
    assert_eq!(err.offset, 0);
    assert!(err.message.contains("assignment target"));
}

#[test]
fn runaway_nesting_is_a_syntax_error() {
    let deep = format!("a.x = {}1{};\n", "(".repeat(10_000), ")".repeat(10_000));
    let err = parse_program(&deep).unwrap_err();
    assert!(err.message.contains("nested deeper"));

    let signs = format!("a.x = {}1;\n", "-".repeat(10_000));
    assert!(parse_program(&signs).is_err());

    let calls = format!("a.x = {}1{};\n", "sin(".repeat(10_000), ")".repeat(10_000));
    assert!(parse_program(&calls).is_err());
}

#[test]
fn moderate_nesting_parses() {
    let src = format!("a.x = {}1{};\n", "(".repeat(100), ")".repeat(100));
    assert!(parse_program(&src).is_ok());
}
