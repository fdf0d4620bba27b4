use clap::Args;
use std::io::{self, Write};
use crate::cli_util::print_error_with_context;
use crate::find_unmatched;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Validate brackets without running anything.
pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let CheckArgs { file, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = match super::load_code(program, file, code) {
        Ok(s) => s,
        Err(exit) => return exit,
    };

    match find_unmatched(&code_str) {
        None => {
            println!("ok");
            let _ = io::stdout().flush();
            0
        }
        Some(bad) => {
            let msg = format!("{program}: Parse error: unmatched bracket {}", bad.kind);
            print_error_with_context(&msg, &code_str, bad.ip);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check "<code>"
  {0} check --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --help,  -h         Show this help

Description:
  Checks that every '[' has a matching ']' and prints "ok", or points at the
  first unmatched bracket and exits with status 1.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
