//! courcelle CLI - MSO model checking on tree decompositions
//!
//! Reads an instance from the file named by the only argument, or from
//! stdin, and prints the outcome.

use std::io::{stdin, stdout, Read, Write};

use courcelle::trace::{info, init_subscriber};

fn main() {
    init_subscriber();

    let input = match read_input() {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match courcelle::solve(&input) {
        Ok(outcome) => {
            info!(metrics = %outcome.metrics, "evaluation finished");
            let mut output = stdout().lock();
            if let Err(e) = write!(output, "{}", outcome) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_input() -> std::io::Result<String> {
    if let Some(path) = std::env::args_os().nth(1) {
        return std::fs::read_to_string(path);
    }
    let mut input = String::new();
    stdin().lock().read_to_string(&mut input)?;
    Ok(input)
}
