use bf_machine::commands::{check, repl, run};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run   [OPTIONS] "<code>"        # Evaluate Brainfuck code (args are concatenated)
  {0} run   [OPTIONS] --file <PATH>   # Evaluate Brainfuck code loaded from file
  {0} check "<code>" | --file <PATH>  # Check that brackets are balanced
  {0} repl  [--bare|--editor]         # Start a Brainfuck REPL (read-eval-print loop)

With no subcommand, starts the REPL.
Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Check(check::CheckArgs),
    Repl(repl::ReplArgs),
}

fn main() {
    // Diagnostics go to stderr so stdout carries only program output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => run::run(&program, args),
        Some(Command::Check(args)) => check::run(&program, args),
        Some(Command::Repl(args)) => repl::run(&program, args),
        None => repl::run(&program, repl::ReplArgs::default()),
    };

    std::process::exit(code);
}
