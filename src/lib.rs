//! A small Brainfuck machine with a Unicode cell range.
//!
//! Features and behaviors:
//! - Sparse tape: unvisited cells read as 0 and cost nothing.
//! - Unbounded tape by default (the head may go negative), or a circular tape
//!   of a fixed number of cells.
//! - Cells hold values in `0..0x110000`; `+` and `-` wrap around that range.
//! - Input `,` takes the next character of the input string; running out of
//!   input aborts the evaluation.
//! - Output `.` appends the character whose code point is the current cell.
//! - Unbalanced brackets are rejected before anything runs.
//! - Characters outside `><+-.,[]` are ignored.
//!
//! Quick start:
//!
//! ```
//! use bf_machine::Machine;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let vm = Machine::default();
//! assert_eq!(vm.eval(code, "").unwrap(), "Hello World!\n");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod machine;
pub mod repl;
pub mod tape;
pub mod theme;
pub mod validate;

pub use machine::{Machine, MachineError, RunReport, StepControl};
pub use tape::{bound_value, Tape, CELL_MODULUS};
pub use validate::{find_unmatched, validate, UnmatchedBracket, UnmatchedBracketKind};
