use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

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

#[test]
fn test_unmatched_close_bracket_points_at_it() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("+.]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error: unmatched bracket ']'"))
        .stderr(predicate::str::contains("at instruction 2"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("[")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unmatched bracket '['"));
}

#[test]
fn test_input_exhausted_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--input", "a", ",.,."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input exhausted"))
        // No partial output: the failed run prints only the trailing newline.
        .stdout("\n");
}

#[test]
fn test_non_instruction_characters_are_ignored() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("+a+ b+.")
        .assert()
        .success()
        .stdout("\u{3}\n");
}
