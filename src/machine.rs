//! The Brainfuck machine.
//!
//! A [`Machine`] only holds its construction parameters. Every evaluation
//! builds a fresh run state (tape, head, instruction pointer, pending input and
//! output), so nothing leaks from one call into the next.
//!
//! Instruction set:
//! - `>` / `<` move the head, wrapping when the tape is bounded.
//! - `+` / `-` change the current cell modulo `0x110000`.
//! - `.` appends the cell's code point to the output.
//! - `,` takes the next input character; running out of input is an error.
//! - `[` skips forward past the matching `]` when the cell is 0.
//! - `]` always jumps back onto its matching `[`, which re-tests the cell.
//! - Anything else is ignored but still occupies an instruction position.

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{debug, trace};

use crate::tape::Tape;
use crate::validate::{find_unmatched, validate, UnmatchedBracketKind};

/// Errors that can occur while evaluating a program.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// Loops were not balanced; the source was rejected before running.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    InvalidSource { ip: usize, kind: UnmatchedBracketKind },

    /// `,` executed with no input left.
    #[error("Input exhausted at instruction {ip}")]
    InputExhausted { ip: usize },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,

    /// A bracket scan ran off the end of the program.
    #[error("Internal error: no matching bracket for the loop at instruction {ip}")]
    UnbalancedScan { ip: usize },

    /// Writing the debug trace failed.
    #[error("Failed to write debug trace: {source}")]
    Trace {
        #[source]
        source: std::io::Error,
    },
}

impl MachineError {
    fn invalid_source(source: &str) -> Self {
        match find_unmatched(source) {
            Some(bad) => MachineError::InvalidSource { ip: bad.ip, kind: bad.kind },
            // Unreachable: validate() and find_unmatched() agree on every source.
            None => MachineError::InvalidSource { ip: 0, kind: UnmatchedBracketKind::Close },
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    /// A step budget with a private, never-raised cancel flag.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self::new(Some(max_steps), Arc::new(AtomicBool::new(false)))
    }

    fn check(&self, steps: usize) -> Result<(), MachineError> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(MachineError::Canceled);
        }
        match self.max_steps {
            Some(limit) if steps >= limit => Err(MachineError::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Output as text. Surrogate code points are replaced with U+FFFD.
    pub output: String,
    /// Output exactly as produced, one code point per `.`.
    pub code_points: Vec<u32>,
    /// Number of instructions executed, including ignored characters.
    pub steps: usize,
}

/// A Brainfuck interpreter configured with a tape size and a loop limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Machine {
    tape_size: usize,
    loop_max: usize,
}

impl Machine {
    /// Create a machine.
    ///
    /// `tape_size` of 0 gives an unbounded tape; otherwise the tape is a circle
    /// of `tape_size` cells. `loop_max` is stored for callers that want to
    /// read it back but does not limit execution.
    pub fn new(tape_size: usize, loop_max: usize) -> Self {
        Self { tape_size, loop_max }
    }

    pub fn tape_size(&self) -> usize {
        self.tape_size
    }

    pub fn loop_max(&self) -> usize {
        self.loop_max
    }

    /// Evaluate `source` against `input` and return everything it printed.
    pub fn eval(&self, source: &str, input: &str) -> Result<String, MachineError> {
        Ok(self.execute(source, input, None, None)?.output)
    }

    /// Evaluate with cooperative cancellation and optional step limit.
    pub fn eval_with_control(
        &self,
        source: &str,
        input: &str,
        control: &StepControl,
    ) -> Result<String, MachineError> {
        Ok(self.execute(source, input, Some(control), None)?.output)
    }

    /// Evaluate while writing a step-by-step table of operations to `out`.
    ///
    /// The program runs exactly as it would under [`Machine::eval`]; the table
    /// is written in addition to, not instead of, producing output.
    pub fn eval_debug<W: Write>(
        &self,
        source: &str,
        input: &str,
        control: Option<&StepControl>,
        out: &mut W,
    ) -> Result<String, MachineError> {
        Ok(self.execute(source, input, control, Some(out as &mut dyn Write))?.output)
    }

    /// Evaluate and return the full [`RunReport`].
    pub fn run(
        &self,
        source: &str,
        input: &str,
        control: Option<&StepControl>,
    ) -> Result<RunReport, MachineError> {
        self.execute(source, input, control, None)
    }

    /// Internal executor shared by every entry point.
    fn execute(
        &self,
        source: &str,
        input: &str,
        control: Option<&StepControl>,
        mut out: Option<&mut dyn Write>,
    ) -> Result<RunReport, MachineError> {
        if !validate(source) {
            return Err(MachineError::invalid_source(source));
        }

        let mut run = Run::new(source, input, self.tape_size);
        debug!(
            source_len = run.program.len(),
            input_len = run.input.len(),
            tape_size = self.tape_size,
            "run started"
        );

        if let Some(w) = out.as_deref_mut() {
            write_trace_header(w)?;
        }

        let mut steps: usize = 0;
        while run.ip < run.program.len() {
            if let Some(ctrl) = control {
                ctrl.check(steps)?;
            }

            let (ip_before, head_before) = (run.ip, run.head);
            let cell_before = run.tape.get(run.head);
            let instr = run.program[run.ip];
            let action = run.step()?;

            if let Some(w) = out.as_deref_mut() {
                writeln!(
                    w,
                    "{:<4} | {:<4} | {:<4} | {:<7} |  {}    | {}",
                    steps,
                    ip_before,
                    head_before,
                    cell_before,
                    printable(instr),
                    action
                )
                .map_err(|source| MachineError::Trace { source })?;
            }

            steps += 1;
        }

        debug!(steps, output_len = run.output.len(), "run finished");
        Ok(run.finish(steps))
    }
}

fn write_trace_header(w: &mut dyn Write) -> Result<(), MachineError> {
    writeln!(w, "STEP | IP   | HEAD | CELL    | INSTR | ACTION")
        .and_then(|_| {
            writeln!(
                w,
                "-----+------+------+---------+-------+------------------------------------------------"
            )
        })
        .map_err(|source| MachineError::Trace { source })
}

/// Keep the trace table on one line per step even for newlines in comments.
fn printable(c: char) -> char {
    if c.is_control() { '·' } else { c }
}

/// What a single instruction did, used for the debug trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Moved(i64),
    Changed { from: u32, to: u32 },
    Wrote(u32),
    Read(u32),
    SkipLoop(usize),
    EnterLoop,
    JumpBack(usize),
    Ignored,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Moved(head) => write!(f, "Moved head to position {head}"),
            Action::Changed { from, to } => write!(f, "Changed cell from {from} to {to}"),
            Action::Wrote(cp) => write!(f, "Output code point {cp:#x}"),
            Action::Read(cp) => write!(f, "Read code point {cp:#x} from input"),
            Action::SkipLoop(ip) => write!(f, "Cell is 0; skip forward to matching ']' at IP {ip}"),
            Action::EnterLoop => write!(f, "Enter loop (cell != 0)"),
            Action::JumpBack(ip) => write!(f, "Jump back to matching '[' at IP {ip}"),
            Action::Ignored => write!(f, "Not an instruction"),
        }
    }
}

/// Per-evaluation state. Dropped at the end of every call.
struct Run {
    program: Vec<char>,
    tape: Tape,
    head: i64,
    ip: usize,
    input: VecDeque<char>,
    output: Vec<u32>,
}

impl Run {
    fn new(source: &str, input: &str, tape_size: usize) -> Self {
        Self {
            program: source.chars().collect(),
            tape: Tape::new(tape_size),
            head: 0,
            ip: 0,
            input: input.chars().collect(),
            output: Vec::new(),
        }
    }

    /// Execute the instruction under the pointer and move the pointer on.
    fn step(&mut self) -> Result<Action, MachineError> {
        let action = match self.program[self.ip] {
            '>' => {
                self.head = self.tape.wrap(self.head + 1);
                Action::Moved(self.head)
            }
            '<' => {
                self.head = self.tape.wrap(self.head - 1);
                Action::Moved(self.head)
            }
            '+' => {
                let from = self.tape.get(self.head);
                let to = self.tape.add(self.head, 1);
                Action::Changed { from, to }
            }
            '-' => {
                let from = self.tape.get(self.head);
                let to = self.tape.add(self.head, -1);
                Action::Changed { from, to }
            }
            '.' => {
                let cp = self.tape.get(self.head);
                self.output.push(cp);
                Action::Wrote(cp)
            }
            ',' => {
                let Some(c) = self.input.pop_front() else {
                    return Err(MachineError::InputExhausted { ip: self.ip });
                };
                self.tape.set(self.head, i64::from(u32::from(c)));
                Action::Read(u32::from(c))
            }
            '[' => {
                if self.tape.get(self.head) == 0 {
                    let close = self.scan_forward(self.ip)?;
                    trace!(ip = self.ip, target = close, "loop skipped");
                    self.ip = close;
                    Action::SkipLoop(close)
                } else {
                    Action::EnterLoop
                }
            }
            ']' => {
                // Land on the matching '[' itself so it re-tests the cell next step.
                let open = self.scan_backward(self.ip)?;
                trace!(ip = self.ip, target = open, "loop repeated");
                self.ip = open;
                return Ok(Action::JumpBack(open));
            }
            _ => Action::Ignored,
        };

        self.ip += 1;
        Ok(action)
    }

    /// Position of the `]` matching the `[` at `from`.
    fn scan_forward(&self, from: usize) -> Result<usize, MachineError> {
        let mut depth = 1usize;
        let mut ip = from;
        while depth > 0 {
            ip += 1;
            match self.program.get(ip) {
                Some('[') => depth += 1,
                Some(']') => depth -= 1,
                Some(_) => {}
                None => return Err(MachineError::UnbalancedScan { ip: from }),
            }
        }
        Ok(ip)
    }

    /// Position of the `[` matching the `]` at `from`.
    fn scan_backward(&self, from: usize) -> Result<usize, MachineError> {
        let mut depth = 1usize;
        let mut ip = from;
        while depth > 0 {
            ip = ip.checked_sub(1).ok_or(MachineError::UnbalancedScan { ip: from })?;
            match self.program[ip] {
                '[' => depth -= 1,
                ']' => depth += 1,
                _ => {}
            }
        }
        Ok(ip)
    }

    fn finish(self, steps: usize) -> RunReport {
        let output = self
            .output
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        RunReport { output, code_points: self.output, steps }
    }
}
