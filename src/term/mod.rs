/*!
## Rill Terminal Module

The thin collaborators around the core: source loading, stdio console,
and the compile → check → execute pipeline for one file.

*/

use crate::error;
use crate::lang::Error;
use crate::mach::{compile, Console, Runtime};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Read a source file as lines.
pub fn load(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    BufReader::new(file).lines().collect()
}

/// Console over standard output and standard input.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&mut self, text: &str) {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn input(&mut self) -> String {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        line
    }
}

/// Compile, check, and execute one source file.
pub fn run_file(path: &Path, interrupt: Option<Arc<AtomicBool>>) -> Result<(), Error> {
    let source = match load(path) {
        Ok(source) => source,
        Err(io) => return Err(error!("cannot open {}: {}", path.display(), io)),
    };
    let mut program = compile(&source)?;
    let mut console = StdConsole::default();
    let mut runtime = Runtime::new(&mut program, &mut console);
    if let Some(flag) = interrupt {
        runtime.set_interrupt(flag);
    }
    runtime.check()?;
    runtime.run()
}
