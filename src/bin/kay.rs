//! CLI entry point: one optional script-path argument, else the REPL.
//!
//! Grounded on `examples/original_source/main.c`, which is itself a two-line
//! `argc`/`argv` dispatch to `run_file`/`run_repl`.

use std::env;
use std::process;

fn main() {
    let mut args = env::args();
    let _argv0 = args.next();
    match args.next() {
        Some(path) => process::exit(kay::repl::run_file(&path)),
        None => kay::repl::run_repl(),
    }
}
