use assert_cmd::Command;
use predicates::prelude::*;

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
fn test_check_balanced_source() {
    cargo_bin()
        .args(["check", "+[>[-]<]"])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_check_reports_caret_under_bracket() {
    cargo_bin()
        .args(["check", "+[-]]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket ']' at instruction 4"))
        .stderr(predicate::str::contains("  +[-]]\n      ^"));
}

#[test]
fn test_check_reports_innermost_open() {
    cargo_bin()
        .args(["check", "[[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket '[' at instruction 0"));
}

#[test]
fn test_check_without_code_prints_usage() {
    cargo_bin()
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}
