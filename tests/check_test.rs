mod common;
use common::*;
use rill::mach::{compile, Runtime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn test_dead_branches_are_still_checked() {
    let source = "\
println \"start\"
if 0 == 1
    nosuch(1)
end";
    let (result, out) = run_capture(source, &[]);
    assert!(result.is_err());
    assert_eq!(out, "", "the check must fail before anything runs");
}

#[test]
fn test_check_reports_the_offending_line() {
    let source = "\
x = 1
if 0 == 1
    x 1
end";
    let error = exec_err(source);
    assert!(error.starts_with("line:3"), "{}", error);
}

#[test]
fn test_junk_after_a_condition() {
    let error = exec_err("while 1 2\nend");
    assert!(error.contains("unexpected"), "{}", error);
}

#[test]
fn test_break_takes_only_a_guard() {
    let source = "\
var i
while i < 1
    break 5
end";
    let error = exec_err(source);
    assert!(error.contains("unexpected '5'"), "{}", error);
}

#[test]
fn test_runaway_loop_is_bounded() {
    // the program itself never ends; the harness step limit reports it
    let error = exec_err("while 1 == 1\nend");
    assert!(error.contains("execution limit"), "{}", error);
}

#[test]
fn test_interrupt_flag_stops_execution() {
    let lines: Vec<String> = "while 1 == 1\nend"
        .lines()
        .map(|s| s.to_string())
        .collect();
    let mut program = compile(&lines).unwrap();
    let mut console = TestConsole::new(&[]);
    let mut runtime = Runtime::new(&mut program, &mut console);
    let flag = Arc::new(AtomicBool::new(false));
    runtime.set_interrupt(flag.clone());
    runtime.check().unwrap();
    flag.store(true, Ordering::SeqCst);
    let error = runtime.run().unwrap_err();
    assert!(error.to_string().contains("interrupted"), "{}", error);
}
