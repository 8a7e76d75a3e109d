mod common;
use common::*;

#[test]
fn test_call_with_arguments() {
    let source = "\
func add(x, y)
    return x + y
end
func main()
    println add(2, 3)
end";
    assert_eq!(exec(source), "5\n");
}

#[test]
fn test_arguments_bind_in_declaration_order() {
    let source = "\
func sub(a, b)
    return a - b
end
func main()
    println sub(10, 4), \" \", sub(sub(9, 3), 2)
end";
    assert_eq!(exec(source), "6 4\n");
}

#[test]
fn test_default_return_value() {
    let source = "\
func f()
end
func main()
    println f()
end";
    assert_eq!(exec(source), "1\n");
}

#[test]
fn test_guarded_return() {
    let source = "\
func clamp(v)
    return 10 ? v > 10
    return v
end
func main()
    println clamp(42), \" \", clamp(3)
end";
    assert_eq!(exec(source), "10 3\n");
}

#[test]
fn test_recursion() {
    let source = "\
func fact(n)
    return 1 ? n <= 1
    return n * fact(n - 1)
end
func main()
    println fact(5)
end";
    assert_eq!(exec(source), "120\n");
}

#[test]
fn test_deeper_recursion() {
    let source = "\
func fib(n)
    return n ? n < 2
    return fib(n - 1) + fib(n - 2)
end
func main()
    println fib(10)
end";
    assert_eq!(exec(source), "55\n");
}

#[test]
fn test_forward_call() {
    let source = "\
func a()
    return b() + 1
end
func b()
    return 41
end
func main()
    println a()
end";
    assert_eq!(exec(source), "42\n");
}

#[test]
fn test_bare_call_discards_result() {
    let source = "\
var $n
func bump()
    $n = $n + 1
end
func main()
    $n = 0
    bump()
    bump()
    println $n
end";
    assert_eq!(exec(source), "2\n");
}

#[test]
fn test_top_level_call_without_main() {
    let source = "\
var $x
$x = 1
func f()
    $x = 99
end
f()
println $x";
    assert_eq!(exec(source), "99\n");
}

#[test]
fn test_top_level_is_skipped_when_main_exists() {
    let source = "\
println \"top\"
func main()
    println \"in\"
end";
    assert_eq!(exec(source), "in\n");
}

#[test]
fn test_function_locals_are_private() {
    let source = "\
var $r
func f()
    x = 5
    x = x + 1
    $r = x
end
f()
println $r";
    assert_eq!(exec(source), "6\n");
}

#[test]
fn test_dollar_names_are_shared_with_functions() {
    let source = "\
var $total
$total = 10
func add(n)
    $total = $total + n
end
add(4)
add(2)
println $total";
    assert_eq!(exec(source), "16\n");
}

#[test]
fn test_wrong_argument_count_fails_the_check() {
    let source = "\
func f(x)
    return x
end
println \"before\"
println f(1, 2)";
    let (result, out) = run_capture(source, &[]);
    let error = result.unwrap_err().to_string();
    assert!(error.contains("number of arguments"), "{}", error);
    assert_eq!(out, "", "the check must fail before anything runs");
}

#[test]
fn test_calling_main_is_rejected() {
    let source = "\
func main()
    println \"hi\"
end
main()";
    let error = exec_err(source);
    assert!(error.contains("main"), "{}", error);
}

#[test]
fn test_main_cannot_have_parameters() {
    let source = "\
func main(x)
end";
    let error = exec_err(source);
    assert!(error.contains("main"), "{}", error);
}

#[test]
fn test_nested_function_definitions_are_rejected() {
    let source = "\
func outer()
    if 1 == 1
        func inner()
        end
    end
end";
    let error = exec_err(source);
    assert!(error.contains("top level"), "{}", error);
}

#[test]
fn test_dollar_declaration_inside_function_is_rejected() {
    let source = "\
func f()
    var $g
end";
    let error = exec_err(source);
    assert!(error.contains("$"), "{}", error);
}

#[test]
fn test_return_outside_function() {
    assert!(exec_err("return 1").contains("return"));
}
