use std::io::{self, IsTerminal, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use crate::config::Settings;
use crate::{Machine, MachineError, StepControl};

/// Read all of stdin as program input. An interactive terminal is not read
/// and yields empty input.
pub fn read_stdin_input() -> io::Result<String> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    read_piped_input(stdin.lock(), interactive)
}

pub fn read_piped_input<R: Read>(mut reader: R, interactive: bool) -> io::Result<String> {
    let mut buf = String::new();
    if !interactive {
        reader.read_to_string(&mut buf)?;
    }
    Ok(buf)
}

/// Evaluate on a worker thread, cancelling it once `settings.timeout_ms` elapses.
///
/// A timeout is reported as [`MachineError::Canceled`]. In `debug` mode the
/// step table is written to stdout while the program runs.
pub fn eval_with_timeout(
    vm: Machine,
    source: &str,
    input: &str,
    settings: &Settings,
    debug: bool,
) -> Result<String, MachineError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Result<String, MachineError>>();
    let ctrl = StepControl::new(settings.max_steps, cancel.clone());
    let (source, input) = (source.to_string(), input.to_string());

    thread::spawn(move || {
        let res = if debug {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            vm.eval_debug(&source, &input, Some(&ctrl), &mut lock)
        } else {
            vm.eval_with_control(&source, &input, &ctrl)
        };
        let _ = tx.send(res);
    });

    match rx.recv_timeout(Duration::from_millis(settings.timeout_ms)) {
        Ok(res) => res,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            tracing::debug!(timeout_ms = settings.timeout_ms, "worker cancelled");
            Err(MachineError::Canceled)
        }
        // The worker died without answering; nothing ran to completion.
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(MachineError::Canceled),
    }
}

/// Report a failed evaluation on stderr.
///
/// Aborts (step limit, timeout) get a single unprefixed line; program errors get
/// the caret diagnostic from [`print_machine_error`].
pub fn print_run_error(program: Option<&str>, code: &str, err: &MachineError, timeout_ms: u64) {
    match err {
        MachineError::StepLimitExceeded { limit } => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
        }
        MachineError::Canceled => {
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
        }
        other => print_machine_error(program, code, other),
    }
    let _ = io::stderr().flush();
}

/// Pretty-print structured MachineError with caret positioning.
/// If `program` is `Some("bf")`, prefix messages with "bf: ..." for CLI run mode
pub fn print_machine_error(program: Option<&str>, code: &str, err: &MachineError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        MachineError::InvalidSource { ip, kind } => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {kind}"));
            print_error_with_context(&msg, code, *ip);
        }
        MachineError::InputExhausted { ip } => {
            let msg = prefix_program("Runtime error: input exhausted");
            print_error_with_context(&msg, code, *ip);
        }
        MachineError::UnbalancedScan { ip } => {
            let msg = prefix_program("Internal error: bracket scan left the program");
            print_error_with_context(&msg, code, *ip);
        }
        MachineError::StepLimitExceeded { .. } | MachineError::Canceled | MachineError::Trace { .. } => {
            eprintln!("{}", prefix_program(&err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let _ = write_error_with_context(&mut io::stderr().lock(), prefix, code, pos);
    let _ = io::stderr().flush();
}

fn write_error_with_context<W: Write>(w: &mut W, prefix: &str, code: &str, pos: usize) -> io::Result<()> {
    writeln!(w, "{prefix} at instruction {pos}")?;

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines and tabs would break caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    writeln!(w, "  {}", slice)?;

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    writeln!(w, "  {}^", " ".repeat(caret_offset_chars))
}
