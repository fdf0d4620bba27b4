// Exercises the minimal bf_runner binary: code from args, input from stdin.
use predicates::prelude::*;

fn runner() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("bf_runner").expect("failed to locate bf_runner binary")
}

#[test]
fn reads_from_stdin_and_echoes_char() {
    runner()
        .arg(",.")
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn empty_stdin_exhausts_input() {
    runner()
        .arg(",.")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Input exhausted at instruction 0"));
}

#[test]
fn debug_flag_prints_table() {
    runner()
        .args(["--debug", ">"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicates::str::contains("STEP | IP")
            .and(predicates::str::contains("Moved head to position 1")));
}

#[test]
fn program_without_input_runs_without_stdin() {
    runner()
        .arg("+.")
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn no_arguments_prints_usage() {
    runner()
        .assert()
        .code(2)
        .stderr(predicates::str::contains("Usage:"));
}
