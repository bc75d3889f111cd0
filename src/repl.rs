//! REPL line loop, file runner, `\`-commands, `\t` timing.
//!
//! Grounded on `examples/original_source/repl.c` (`process_line`,
//! `execute`, `run_file`, `run_repl`, `parse_timing_args`,
//! `time_and_print_average`, `monotonic_ns`). The teacher has no CLI binary
//! of its own to model this on, so the shape is taken directly from the
//! original source in its own plain style — no argument-parsing crate, just
//! `std::env`/`std::io`, matching that file's minimal footprint.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::eval::{self, Env};
use crate::ops::OpTag;
use crate::parser::{Ast, Parser};
use crate::printer;

fn trim_line(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r' || c == '\n')
}

/// A top-level `:` assignment (or a `;`-sequence entirely made of them)
/// suppresses printing.
fn is_assignment(ast: &Ast) -> bool {
    match ast {
        Ast::Binary(OpTag::Colon, _, _) => true,
        Ast::Seq(items) => !items.is_empty() && items.iter().all(is_assignment),
        _ => false,
    }
}

fn execute(line: &str, env: &mut Env, print_result: bool) {
    let mut parser = Parser::new(line);
    match parser.parse_program() {
        Ok(ast) => {
            let result = eval::eval(&ast, env);
            if print_result && !is_assignment(&ast) {
                if let Some(s) = printer::print(&result) {
                    print!("{}", s);
                }
            }
        }
        Err(_) => println!("^parse"),
    }
}

fn parse_timing_args(q: &str) -> (u32, &str) {
    let bytes = q.as_bytes();
    let mut i = 0;
    if i < bytes.len() && bytes[i].is_ascii_digit() {
        let digit_start = i;
        let mut tmp: u64 = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            tmp = tmp * 10 + (bytes[i] - b'0') as u64;
            i += 1;
        }
        if i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
                i += 1;
            }
            return (tmp as u32, &q[i..]);
        }
        return (1, &q[digit_start..]);
    }
    (1, q.trim_start_matches(|c| c == ' ' || c == '\t'))
}

fn time_and_print_average(expr: &str, runs: u32, env: &mut Env) {
    let runs = runs.max(1);
    let mut total = std::time::Duration::ZERO;
    for _ in 0..runs {
        let start = Instant::now();
        execute(expr, env, false);
        total += start.elapsed();
    }
    let avg_ms = total.as_millis() as u64 / runs as u64;
    println!("{}", avg_ms);
}

/// Returns `false` when the session should end (`\\`).
fn process_line(line: &str, env: &mut Env, interactive: bool) -> bool {
    let p = trim_line(line);
    if p.is_empty() {
        if interactive {
            print!("  ");
            let _ = io::stdout().flush();
        }
        return true;
    }
    if p == "\\\\" {
        return false;
    }
    if p == "\\" {
        match std::fs::read_to_string("man") {
            Ok(contents) => print!("{}", contents),
            Err(_) => println!("^io"),
        }
        if interactive {
            print!("  ");
            let _ = io::stdout().flush();
        }
        return true;
    }
    if p == "\\v" {
        print!("{}", env.dump());
        if interactive {
            print!("  ");
            let _ = io::stdout().flush();
        }
        return true;
    }
    if let Some(rest) = p.strip_prefix("\\t") {
        let (runs, expr) = parse_timing_args(rest);
        if expr.is_empty() {
            println!("0");
            if interactive {
                print!("  ");
                let _ = io::stdout().flush();
            }
            return true;
        }
        time_and_print_average(expr, runs, env);
        if interactive {
            print!("  ");
            let _ = io::stdout().flush();
        }
        return true;
    }
    execute(p, env, true);
    if interactive {
        print!("  ");
        let _ = io::stdout().flush();
    }
    true
}

/// Runs a script file line by line. Returns the process exit code.
pub fn run_file(path: &str) -> i32 {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            println!("^io");
            return 1;
        }
    };
    let mut env = Env::new();
    for line in contents.lines() {
        process_line(line, &mut env, false);
    }
    0
}

pub fn run_repl() {
    let mut env = Env::new();
    print!("  ");
    let _ = io::stdout().flush();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if !process_line(&line, &mut env, true) {
            break;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timing_args_with_explicit_count() {
        assert_eq!(parse_timing_args("3 1+1"), (3, "1+1"));
    }

    #[test]
    fn timing_args_without_count_defaults_to_one() {
        assert_eq!(parse_timing_args("1+1"), (1, "1+1"));
    }

    #[test]
    fn timing_args_digit_with_no_trailing_space_is_not_a_count() {
        // "5+3" — the digit isn't followed by whitespace, so it's part of
        // the expression, not a run count.
        assert_eq!(parse_timing_args("5+3"), (1, "5+3"));
    }
}
