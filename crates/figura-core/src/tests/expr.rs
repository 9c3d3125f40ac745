use crate::expr::{CompiledExpr, ExprError, MAX_DEPTH, evaluate};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn precedence_and_associativity() {
    assert!(close(evaluate("1 + 2 * 3", 0.0), 7.0));
    assert!(close(evaluate("(1 + 2) * 3", 0.0), 9.0));
    assert!(close(evaluate("8 / 4 / 2", 0.0), 1.0));
    assert!(close(evaluate("2^3^2", 0.0), 512.0));
    assert!(close(evaluate("2**3", 0.0), 8.0));
    assert!(close(evaluate("10 - 4 - 3", 0.0), 3.0));
}

#[test]
fn unary_minus_binds_looser_than_power() {
    assert!(close(evaluate("-x^2", 3.0), -9.0));
    assert!(close(evaluate("2^-1", 0.0), 0.5));
    assert!(close(evaluate("--x", 2.0), 2.0));
    assert!(close(evaluate("+x", 2.0), 2.0));
}

#[test]
fn implicit_multiplication() {
    assert!(close(evaluate("2x", 4.0), 8.0));
    assert!(close(evaluate("3sin(x)", std::f64::consts::FRAC_PI_2), 3.0));
    assert!(close(evaluate("2(x+1)", 1.0), 4.0));
    assert!(close(evaluate("(x+1)(x-1)", 3.0), 8.0));
    assert!(close(evaluate("2pi", 0.0), 2.0 * std::f64::consts::PI));
    assert!(close(evaluate("2x^2 - 3x + 1", 2.0), 3.0));
}

#[test]
fn absolute_value_bars() {
    assert!(close(evaluate("|x - 3|", 1.0), 2.0));
    assert!(close(evaluate("2|x|", -3.0), 6.0));
    assert!(close(evaluate("|x| + |x - 1|", 0.5), 1.0));
    assert!(close(evaluate("abs(x)", -4.0), 4.0));
}

#[test]
fn functions_and_constants() {
    assert!(close(evaluate("log(100)", 0.0), 2.0));
    assert!(close(evaluate("ln(e)", 0.0), 1.0));
    assert!(close(evaluate("exp(0)", 0.0), 1.0));
    assert!(close(evaluate("sqrt(x)", 16.0), 4.0));
    assert!(close(evaluate("cos(pi)", 0.0), -1.0));
    assert!(close(evaluate("tan(0)", 0.0), 0.0));
    assert!(close(evaluate("π", 0.0), std::f64::consts::PI));
}

#[test]
fn identifiers_are_case_insensitive() {
    assert!(close(evaluate("SIN(PI/2)", 0.0), 1.0));
    assert!(close(evaluate("2X", 3.0), 6.0));
}

#[test]
fn number_forms() {
    assert!(close(evaluate("1e-3", 0.0), 0.001));
    assert!(close(evaluate(".5x", 2.0), 1.0));
    assert!(close(evaluate("2.5", 0.0), 2.5));
    assert!(close(evaluate("1.5E2", 0.0), 150.0));
}

#[test]
fn undefined_results_are_nan() {
    assert!(evaluate("1/x", 0.0).is_nan());
    assert!(evaluate("sqrt(x)", -1.0).is_nan());
    assert!(evaluate("ln(x)", 0.0).is_nan());
    assert!(evaluate("log(x)", -5.0).is_nan());
}

#[test]
fn unknown_identifiers_are_rejected() {
    assert!(evaluate("foo(x)", 1.0).is_nan());
    assert!(evaluate("x + y", 1.0).is_nan());
    assert_eq!(
        CompiledExpr::compile("foo(x)").unwrap_err(),
        ExprError::UnknownIdentifier {
            name: "foo".to_string(),
            position: 0
        }
    );
    assert!(matches!(
        CompiledExpr::compile("2 * alert(1)").unwrap_err(),
        ExprError::UnknownIdentifier { ref name, position: 4 } if name == "alert"
    ));
}

#[test]
fn syntax_errors() {
    assert_eq!(
        CompiledExpr::compile("1 +").unwrap_err(),
        ExprError::UnexpectedEnd
    );
    assert_eq!(CompiledExpr::compile("").unwrap_err(), ExprError::UnexpectedEnd);
    assert!(matches!(
        CompiledExpr::compile("1 + )").unwrap_err(),
        ExprError::UnexpectedToken { position: 4, .. }
    ));
    assert!(matches!(
        CompiledExpr::compile("sin x").unwrap_err(),
        ExprError::UnexpectedToken { .. }
    ));
    assert!(matches!(
        CompiledExpr::compile("2 $ 3").unwrap_err(),
        ExprError::InvalidCharacter { position: 2, .. }
    ));
    assert!(matches!(
        CompiledExpr::compile("(x + 1").unwrap_err(),
        ExprError::UnexpectedEnd
    ));
    assert!(matches!(
        CompiledExpr::compile("|x").unwrap_err(),
        ExprError::UnexpectedEnd
    ));
}

#[test]
fn input_limits() {
    let long = "x+".repeat(300) + "1";
    assert!(matches!(
        CompiledExpr::compile(&long).unwrap_err(),
        ExprError::TooLong { max: 512, .. }
    ));

    let ok_depth = MAX_DEPTH - 4;
    let nested = format!("{}x{}", "(".repeat(ok_depth), ")".repeat(ok_depth));
    assert!(close(CompiledExpr::compile(&nested).unwrap().eval(2.0), 2.0));

    let too_deep = MAX_DEPTH + 6;
    let nested = format!("{}x{}", "(".repeat(too_deep), ")".repeat(too_deep));
    assert_eq!(
        CompiledExpr::compile(&nested).unwrap_err(),
        ExprError::TooDeep { max: MAX_DEPTH }
    );

    let signs = format!("{}x", "-".repeat(200));
    assert_eq!(
        CompiledExpr::compile(&signs).unwrap_err(),
        ExprError::TooDeep { max: MAX_DEPTH }
    );
}

#[test]
fn compiled_expression_is_reusable() {
    let f = CompiledExpr::compile("x^2 - 1").unwrap();
    assert_eq!(f.source(), "x^2 - 1");
    let ys: Vec<f64> = [-1.0, 0.0, 1.0, 2.0].iter().map(|&x| f.eval(x)).collect();
    assert_eq!(ys, vec![0.0, -1.0, 0.0, 3.0]);
}
