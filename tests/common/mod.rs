use rill::lang::Error;
use rill::mach::{compile, Console, Runtime};
use std::collections::VecDeque;

/// Console over string buffers, with scripted input lines.
pub struct TestConsole {
    pub out: String,
    feed: VecDeque<String>,
}

impl TestConsole {
    pub fn new(feed: &[&str]) -> TestConsole {
        TestConsole {
            out: String::new(),
            feed: feed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Console for TestConsole {
    fn print(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn input(&mut self) -> String {
        self.feed.pop_front().unwrap_or_default()
    }
}

/// Compile, check, and run a program, returning the outcome and whatever
/// was printed before it. Execution is bounded so intentionally infinite
/// programs stay finite.
pub fn run_capture(source: &str, feed: &[&str]) -> (Result<(), Error>, String) {
    let lines: Vec<String> = source.lines().map(|s| s.to_string()).collect();
    let mut program = match compile(&lines) {
        Ok(program) => program,
        Err(error) => return (Err(error), String::new()),
    };
    let mut console = TestConsole::new(feed);
    let result = {
        let mut runtime = Runtime::new(&mut program, &mut console);
        runtime.set_step_limit(100_000);
        match runtime.check() {
            Ok(()) => runtime.run(),
            Err(error) => Err(error),
        }
    };
    (result, console.out)
}

pub fn exec(source: &str) -> String {
    let (result, out) = run_capture(source, &[]);
    if let Err(error) = result {
        panic!("unexpected error: {} (output so far {:?})", error, out);
    }
    out
}

pub fn exec_with_input(source: &str, feed: &[&str]) -> String {
    let (result, out) = run_capture(source, feed);
    if let Err(error) = result {
        panic!("unexpected error: {} (output so far {:?})", error, out);
    }
    out
}

pub fn exec_err(source: &str) -> String {
    let (result, out) = run_capture(source, &[]);
    match result {
        Ok(()) => panic!("expected an error, got output {:?}", out),
        Err(error) => error.to_string(),
    }
}
