extern crate ansi_term;
extern crate ctrlc;

use ansi_term::Style;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The Rill scripting language.
#[derive(Parser)]
#[command(name = "rill", version)]
struct Cli {
    /// Source file to run.
    source: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            process::exit(1);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    if let Err(error) = rill::term::run_file(&cli.source, Some(interrupted)) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        process::exit(1);
    }
}
