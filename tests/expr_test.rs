mod common;
use common::*;

#[test]
fn test_precedence() {
    let source = "\
var a
a = 3 + 4 * 2
println a";
    assert_eq!(exec(source), "11\n");
}

#[test]
fn test_parentheses() {
    let source = "\
var a
a = (3 + 4) * 2
println a";
    assert_eq!(exec(source), "14\n");
}

#[test]
fn test_left_to_right() {
    assert_eq!(exec("println 10 - 2 - 3"), "5\n");
    assert_eq!(exec("println 100 / 10 / 2"), "5\n");
}

#[test]
fn test_division_kinds() {
    assert_eq!(exec("println 7 / 2"), "3.5\n");
    assert_eq!(exec("println 7 \\ 2"), "3\n");
    assert_eq!(exec("println 7 % 3"), "1\n");
    // modulo and integer division truncate both operands first
    assert_eq!(exec("println 7.9 % 3.9"), "1\n");
    assert_eq!(exec("println 9.9 \\ 2.9"), "4\n");
}

#[test]
fn test_division_by_zero() {
    assert_eq!(exec_err("println 1 / 0"), "line:1 ERROR division by zero");
    assert!(exec_err("println 1 % 0").contains("division by zero"));
    assert!(exec_err("println 1 \\ 0").contains("division by zero"));
    // a fractional divisor truncates to zero for the integer operations
    assert!(exec_err("println 1 \\ 0.5").contains("division by zero"));
}

#[test]
fn test_unary_operators() {
    assert_eq!(exec("println -3 + 5"), "2\n");
    assert_eq!(exec("println +7"), "7\n");
    assert_eq!(exec("println !0, \" \", !7"), "1 0\n");
    assert_eq!(exec("println -(2 + 3)"), "-5\n");
}

#[test]
fn test_relational_and_equality() {
    assert_eq!(exec("println 1 < 2, \" \", 2 <= 1"), "1 0\n");
    assert_eq!(exec("println 2 > 1, \" \", 1 >= 2"), "1 0\n");
    assert_eq!(exec("println 1 == 1, \" \", 1 != 1"), "1 0\n");
    assert_eq!(exec("println 3 > 2 == 1"), "1\n");
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let source = "\
var $hits
func side()
    $hits = $hits + 1
    return 1
end
func main()
    var r
    $hits = 0
    r = 0 && side()
    r = 1 || side()
    println r, \" \", $hits
end";
    assert_eq!(exec(source), "1 2\n");
}

#[test]
fn test_toint_truncates_toward_zero() {
    assert_eq!(exec("println toint(3.9), \" \", toint(-3.9)"), "3 -3\n");
    assert_eq!(exec("println toint(2.5) * 2"), "4\n");
}

#[test]
fn test_uninitialized_read() {
    let error = exec_err("var a\nprintln a");
    assert!(error.contains("uninitialized"), "{}", error);
    assert!(error.starts_with("line:2"), "{}", error);
}

#[test]
fn test_runtime_error_reports_innermost_line() {
    let source = "\
func f()
    return 1 / 0
end
func main()
    f()
end";
    assert_eq!(exec_err(source), "line:2 ERROR division by zero");
}
