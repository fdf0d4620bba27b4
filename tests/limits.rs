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

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] spins forever
}

#[test]
fn test_run_timeout_flag() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_MAX_STEPS")
        .args(["run", "--timeout", "100", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wall-clock timeout exceeded (100 ms)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_step_limit_flag() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .args(["run", "--max-steps", "50", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_flag_overrides_env_step_limit() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "5")
        .args(["run", "--max-steps", "100", "++++++++."])
        .assert()
        .success()
        .stdout("\u{8}\n");
}

#[test]
fn test_repl_bare_timeout_infinite() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_MAX_STEPS")
        .env("BF_TIMEOUT_MS", "100")
        .write_stdin(infinite_bf())
        .assert()
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_repl_bare_step_limit_infinite() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "50")
        .env_remove("BF_TIMEOUT_MS")
        .write_stdin(infinite_bf())
        .assert()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}
