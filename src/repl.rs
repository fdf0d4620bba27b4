//! Read-eval-print loop.
//!
//! A submission is Brainfuck source, optionally followed by a line holding only
//! `!` and then the text to feed to `,`. Every submission runs on a fresh
//! machine state.

use std::env;
use std::io::{self, IsTerminal, Write};
use reedline::{Signal, DefaultPrompt, DefaultPromptSegment, HistoryItem, Highlighter, StyledText};
use nu_ansi_term::Style;
use crate::config::Settings;
use crate::{cli_util, Machine};

/// Line separating program source from its input inside one submission.
pub const INPUT_SEPARATOR: &str = "!";

/// A submission split into source and input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub source: String,
    pub input: String,
}

impl Submission {
    /// Split at the first line that is exactly [`INPUT_SEPARATOR`].
    ///
    /// The input keeps its own line breaks except the one that ends the
    /// submission, so `",.\n!\nA\n"` feeds just `A` to the program.
    pub fn parse(buffer: &str) -> Self {
        let mut source = String::new();
        let mut lines = buffer.split_inclusive('\n');
        for line in lines.by_ref() {
            if line.trim_end_matches(['\r', '\n']) == INPUT_SEPARATOR {
                let rest: String = lines.collect();
                let input = rest.strip_suffix('\n').unwrap_or(&rest);
                let input = input.strip_suffix('\r').unwrap_or(input);
                return Self { source, input: input.to_string() };
            }
            source.push_str(line);
        }
        Self { source, input: String::new() }
    }

    /// True when the source holds at least one instruction.
    pub fn has_instructions(&self) -> bool {
        self.source.chars().any(|c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']'))
    }
}

pub fn repl_loop(vm: Machine, settings: Settings) -> io::Result<()> {
    // Initialize interactive line editor
    let mut editor = init_line_editor()?;

    loop {
        let Some(buffer) = read_submission_interactive(&mut editor)? else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        let submission = Submission::parse(&buffer);
        if !submission.has_instructions() {
            continue;
        }

        execute_submission(vm, &settings, &submission);

        // Test hook: if BF_REPL_ONCE=1, exit after one execution
        if env::var("BF_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{
        default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
    };

    // Start from default emacs-like bindings and adjust:
    // - Enter -> InsertNewLine (do not submit)
    // - Ctrl+D -> AcceptLine (submit)
    // - Ctrl+Z -> AcceptLine (submit, for Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(BrainfuckHighlighter::new_catppuccin_mocha()))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

/// Collect everything until EOF. `None` when nothing was read.
pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => buffer.push_str(&line),
            // Read error, ignore
            Err(_) => return None,
        }
    }

    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bf".to_string()), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // Add one history item per submitted buffer (program-level)
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

/// Evaluates one submission.
/// - Program output goes to stdout.
/// - Errors are printed concisely to stderr.
/// - A newline is always written to stdout after execution (success or error)
///   so that the prompt begins at column 0 on the next iteration.
fn execute_submission(vm: Machine, settings: &Settings, submission: &Submission) {
    match cli_util::eval_with_timeout(vm, &submission.source, &submission.input, settings, false) {
        Ok(output) => print!("{output}"),
        Err(err) => cli_util::print_run_error(None, &submission.source, &err, settings.timeout_ms),
    }
    println!();
    let _ = io::stdout().flush();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Flags first, then `BF_REPL_MODE`, then whether stdin is a terminal.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    resolve_mode(flag, env::var("BF_REPL_MODE").ok().as_deref(), io::stdin().is_terminal())
}

fn resolve_mode(flag: ModeFlagOverride, env_mode: Option<&str>, stdin_tty: bool) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !stdin_tty {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BF_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" if stdin_tty => Ok(ReplMode::Editor),
            "editor" => Err("cannot start editor: stdin is not a TTY (use BF_REPL_MODE=bare)".to_string()),
            _ => Err(format!("invalid BF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

pub fn execute_bare_once(vm: Machine, settings: Settings) -> io::Result<()> {
    let mut locked = io::BufReader::new(io::stdin().lock());
    if let Some(buffer) = read_submission(&mut locked) {
        let submission = Submission::parse(&buffer);
        if submission.has_instructions() {
            execute_submission(vm, &settings, &submission);
        }
    }
    Ok(())
}

#[derive(Default)]
struct BrainfuckHighlighter {
    map_plus: Style,
    map_minus: Style,
    map_lt: Style,
    map_gt: Style,
    map_dot: Style,
    map_comma: Style,
    map_bracket: Style,
    map_other: Style,
}

impl BrainfuckHighlighter {
    fn new_catppuccin_mocha() -> Self {
        use crate::theme::catppuccin::Mocha as P;

        // > <   => SKY/TEAL (movement)
        // + -   => GREEN/RED (data modification)
        // . ,   => YELLOW/PEACH (I/O)
        // [ ]   => MAUVE (flow control)
        Self {
            map_gt: Style::new().fg(P::SKY).bold(),
            map_lt: Style::new().fg(P::TEAL).bold(),
            map_plus: Style::new().fg(P::GREEN).bold(),
            map_minus: Style::new().fg(P::RED).bold(),
            map_dot: Style::new().fg(P::YELLOW).bold(),
            map_comma: Style::new().fg(P::PEACH).bold(),
            map_bracket: Style::new().fg(P::MAUVE).bold(),
            map_other: Style::new().fg(P::SURFACE2),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' => self.map_gt,
            '<' => self.map_lt,
            '+' => self.map_plus,
            '-' => self.map_minus,
            '.' => self.map_dot,
            ',' => self.map_comma,
            '[' | ']' => self.map_bracket,
            _ => self.map_other,
        }
    }
}

impl Highlighter for BrainfuckHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut current: Option<(Style, String)> = None;

        for ch in line.chars() {
            let style = self.style_for(ch);
            match current.as_mut() {
                Some((s, buf)) if *s == style => buf.push(ch),
                _ => {
                    if let Some(done) = current.take() {
                        out.push(done);
                    }
                    current = Some((style, ch.to_string()));
                }
            }
        }

        if let Some(done) = current {
            out.push(done);
        }
        out
    }
}
