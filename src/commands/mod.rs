//! Subcommands of the `bf` binary.

pub mod check;
pub mod repl;
pub mod run;

use std::fs;
use std::io::{self, Write};

/// Source from `--file` or the concatenated positional parts.
///
/// On failure the error has already been reported and the exit code is returned.
fn load_code(program: &str, file: Option<String>, code: Vec<String>) -> Result<String, i32> {
    match file {
        Some(path) => fs::read_to_string(&path).map_err(|e| {
            eprintln!("{program}: failed to read code file as UTF-8: {e}");
            let _ = io::stderr().flush();
            1
        }),
        None => Ok(code.join("")),
    }
}
