mod common;
use common::*;

#[test]
fn test_auto_declared_global() {
    assert_eq!(exec("x = 5\nprintln x"), "5\n");
}

#[test]
fn test_print_and_println() {
    assert_eq!(exec("print 1, 2"), "12");
    assert_eq!(exec("print \"a\", 1 + 1"), "a2");
    assert_eq!(exec("println \"hello\", \" \", \"world\""), "hello world\n");
    assert_eq!(exec("println 1\nprintln 2"), "1\n2\n");
}

#[test]
fn test_option_var_requires_declarations() {
    let error = exec_err("option \"var\"\nx = 1");
    assert!(error.contains("declaration is required"), "{}", error);
    assert!(error.starts_with("line:2"), "{}", error);
    assert_eq!(exec("option \"var\"\nvar x\nx = 1\nprintln x"), "1\n");
}

#[test]
fn test_var_lists() {
    let source = "\
var a, b, c
a = 1
b = 2
c = a + b
println a, b, c";
    assert_eq!(exec(source), "123\n");
}

#[test]
fn test_duplicate_declaration() {
    let error = exec_err("var a, a");
    assert!(error.contains("already declared"), "{}", error);
    assert!(exec_err("var a\nvar a").contains("already declared"));
}

#[test]
fn test_exit_stops_the_program() {
    assert_eq!(exec("println \"a\"\nexit\nprintln \"b\""), "a\n");
}

#[test]
fn test_exit_inside_function() {
    let source = "\
func f()
    exit
end
func main()
    println \"a\"
    f()
    println \"b\"
end";
    assert_eq!(exec(source), "a\n");
}

#[test]
fn test_string_only_allowed_in_print() {
    let error = exec_err("var a\na = \"text\"");
    assert!(error.contains("expression error"), "{}", error);
}

#[test]
fn test_comments_and_blank_lines() {
    let source = "\
// a comment

println 1 // trailing comment";
    assert_eq!(exec(source), "1\n");
}

#[test]
fn test_bare_end() {
    assert!(exec_err("end").contains("end"));
}

#[test]
fn test_unknown_token() {
    let error = exec_err("a = 1 @ 2");
    assert_eq!(error, "line:1 ERROR unknown token '@'");
}

#[test]
fn test_unclosed_string() {
    let error = exec_err("println \"open");
    assert!(error.contains("not closed"), "{}", error);
}

#[test]
fn test_line_length_ceiling() {
    let long = format!("println \"{}\"", "x".repeat(300));
    let error = exec_err(&long);
    assert!(error.contains("255"), "{}", error);
}

#[test]
fn test_program_length_ceiling() {
    let source = vec!["x = 1"; 2001].join("\n");
    let error = exec_err(&source);
    assert!(error.contains("2000"), "{}", error);
}
