use clap::Args;
use std::fs;
use std::io::{self, Write};
use crate::Machine;
use crate::cli_util::{eval_with_timeout, print_run_error, read_stdin_input};
use crate::config::{self, Settings};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations while executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Text consumed by ',' (otherwise piped stdin, otherwise empty)
    #[arg(short = 'i', long = "input", conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the text consumed by ',' from PATH
    #[arg(long = "input-file", value_name = "PATH")]
    pub input_file: Option<String>,

    /// Number of cells on a circular tape; 0 for unbounded (fallback BF_TAPE_SIZE)
    #[arg(long = "tape-size", value_name = "N")]
    pub tape_size: Option<usize>,

    /// Reserved loop limit, stored but not enforced (fallback BF_LOOP_MAX)
    #[arg(long = "loop-max", value_name = "N")]
    pub loop_max: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        input,
        input_file,
        tape_size,
        loop_max,
        timeout_ms,
        max_steps,
        code,
        ..
    } = args;

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

    let input_str = match resolve_input(input, input_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: failed to read input: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Resolve limits: flags -> env -> config file -> defaults
    let settings = match config::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };
    let settings = Settings {
        tape_size: tape_size.unwrap_or(settings.tape_size),
        loop_max: loop_max.unwrap_or(settings.loop_max),
        max_steps: max_steps.or(settings.max_steps),
        timeout_ms: timeout_ms.unwrap_or(settings.timeout_ms),
    };
    tracing::debug!(?settings, "resolved run settings");

    let vm = Machine::new(settings.tape_size, settings.loop_max);
    let exit_code = match eval_with_timeout(vm, &code_str, &input_str, &settings, debug) {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => {
            print_run_error(Some(program), &code_str, &err, settings.timeout_ms);
            1
        }
    };

    println!();
    let _ = io::stdout().flush();
    exit_code
}

/// `--input`, then `--input-file`, then piped stdin. A terminal stdin is not read.
fn resolve_input(input: Option<String>, input_file: Option<String>) -> io::Result<String> {
    if let Some(text) = input {
        return Ok(text);
    }
    if let Some(path) = input_file {
        return fs::read_to_string(path);
    }
    read_stdin_input()
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"     # options go before the code
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>   Read Brainfuck code from PATH instead of positional "<code>"
  --input, -i <TEXT>   Text consumed by ','
  --input-file <PATH>  Read the text consumed by ',' from PATH
  --tape-size <N>      Circular tape of N cells (0 = unbounded, the default)
  --loop-max <N>       Reserved; stored but not enforced
  --max-steps <N>      Abort after N executed instructions
  --timeout <MS>       Abort after MS milliseconds of wall-clock time
  --debug, -d          Print a step-by-step table of operations while executing
  --help,  -h          Show this help

Notes:
- Without --input or --input-file, piped stdin is used as input.
- Reading past the end of the input (`,`) is an error.
- Characters outside of Brainfuck's ><+-.,[] are ignored.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Echo two characters:
    {0} run --input hi ",.,."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
