use bf_machine::Machine;
use bf_machine::cli_util::read_stdin_input;
use std::env;
use std::io;

fn print_usage_and_exit(program: &str) -> ! {
    eprintln!(
        "Usage:\n  {0} [--debug|-d] \"<code>\"   # Run Brainfuck code (args are concatenated)\n\nOptions:\n  --debug, -d   Print a step-by-step table of operations while executing\n  --help,  -h   Show this help\n\nNotes:\n- Input (`,`) reads from the whole of piped stdin; a terminal stdin is empty input.\n- Running past the end of the input is an error.\n- Characters outside of Brainfuck's ><+-.,[] are ignored.\n",
        program
    );
    std::process::exit(2);
}

fn main() {
    // Collect all CLI args after the program name
    let args: Vec<String> = env::args().skip(1).collect();
    let program = env::args().next().unwrap_or_else(|| "bf_runner".to_string());

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage_and_exit(&program);
    }

    // Parse flags and build code by concatenating non-flag args
    let mut debug = false;
    let mut code_parts: Vec<String> = Vec::new();
    for a in args {
        match a.as_str() {
            "--debug" | "-d" => debug = true,
            "--help" | "-h" => print_usage_and_exit(&program),
            _ => code_parts.push(a),
        }
    }

    if code_parts.is_empty() {
        print_usage_and_exit(&program);
    }

    let code = code_parts.join("");

    // A terminal stdin counts as empty input so programs without ',' never block
    let input = match read_stdin_input() {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Brainfuck interpreter error: failed reading stdin: {err}");
            std::process::exit(1);
        }
    };

    let vm = Machine::default();
    let result = if debug {
        vm.eval_debug(&code, &input, None, &mut io::stdout().lock())
    } else {
        vm.eval(&code, &input)
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("Brainfuck interpreter error: {err}");
            std::process::exit(1);
        }
    }

    // For readability, ensure output ends with a newline
    println!();
}
