use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::config;
use crate::repl::{execute_bare_once, repl_loop, select_mode, ReplMode, ModeFlagOverride};
use crate::Machine;

#[derive(Args, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        match (self.bare, self.editor) {
            (true, _) => ModeFlagOverride::Bare,
            (_, true) => ModeFlagOverride::Editor,
            _ => ModeFlagOverride::None,
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let settings = match config::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };
    let vm = Machine::new(settings.tape_size, settings.loop_max);

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let result = match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("Brainfuck REPL (interactive editor mode)");
                eprintln!("Ctrl+d/Ctrl+z Enter (Windows) executes the current buffer. Press ctrl+c to exit");
                eprintln!("Put a line holding only '!' between the program and its input.");
                let _ = io::stderr().flush();
            }
            repl_loop(vm, settings)
        }
        // Bare mode: read stdin until EOF, execute once, exit 0
        ReplMode::Bare => execute_bare_once(vm, settings),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{program}: REPL error: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a Brainfuck REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)

Description:
  Starts a REPL where you can enter Brainfuck code and execute it live.

Notes:
    - A line holding only '!' ends the program; the text after it is the input for ','.
    - Ctrl+D executes the current buffer on *nix/macOS.
    - Ctrl+Z and Enter will execute the current buffer on Windows.
    - Ctrl+C exits the REPL immediately.
    - The REPL will print a newline after each execution for readability.
    - Each execution starts with a fresh tape, head and input.
    - The REPL will exit after a single execution if the environment variable `BF_REPL_ONCE` is set to `1`.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BF_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * Prompts/banners suppressed if stderr is not a TTY.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
