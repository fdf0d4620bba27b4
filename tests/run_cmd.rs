use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

// No config file and no BF_* settings leak in from the caller's environment
fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf-machine.toml")
        .env_remove("BF_TAPE_SIZE")
        .env_remove("BF_LOOP_MAX")
        .env_remove("BF_MAX_STEPS")
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("BF_REPL_MODE")
        .env_remove("BF_REPL_ONCE");
    cmd
}

const HELLO_WORLD: &str = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_positional_code_success() {
    cargo_bin()
        .arg("run").arg(HELLO_WORLD)
        .assert()
        .success()
        .stdout("Hello World!\n\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_positional_parts_are_concatenated() {
    cargo_bin()
        .args(["run", "++", "+."])
        .assert()
        .success()
        .stdout("\u{3}\n");
}

#[test]
fn test_run_file_success() {
    let tf = read_to_tempfile(HELLO_WORLD);
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_rejects_file_and_positional_code() {
    let tf = read_to_tempfile("+.");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path()).arg("+.")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}

#[test]
fn test_run_input_flag() {
    cargo_bin()
        .args(["run", "--input", "hi", ",.,."])
        .assert()
        .success()
        .stdout("hi\n");
}

#[test]
fn test_run_input_file() {
    let tf = read_to_tempfile("ok");
    cargo_bin()
        .arg("run").arg("--input-file").arg(tf.path()).arg(",.,.")
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_run_reads_piped_stdin_as_input() {
    cargo_bin()
        .args(["run", ",[.,]"])
        .write_stdin("abc")
        .assert()
        // The loop reads until input runs out, so this fails on the last ','.
        .failure()
        .stderr(predicate::str::contains("input exhausted"));
}

#[test]
fn test_run_unicode_input_round_trips() {
    cargo_bin()
        .args(["run", "--input", "λ", ",."])
        .assert()
        .success()
        .stdout("λ\n");
}

#[test]
fn test_run_bounded_tape_wraps() {
    cargo_bin()
        .args(["run", "--tape-size", "3", "+>>>."])
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn test_run_unbounded_tape_does_not_wrap() {
    cargo_bin()
        .args(["run", "+>>>."])
        .env("BF_CONFIG", "/nonexistent/bf-machine.toml")
        .env_remove("BF_TAPE_SIZE")
        .assert()
        .success()
        .stdout("\u{0}\n");
}

#[test]
fn test_run_debug_prints_table() {
    cargo_bin()
        .arg("run").arg("--debug").arg("+.>")
        .assert()
        .success()
        .stdout(predicate::str::contains("STEP | IP")
            .and(predicate::str::contains("Changed cell from 0 to 1"))
            .and(predicate::str::contains("Moved head to position 1")))
        .stderr(predicate::str::is_empty());
}
