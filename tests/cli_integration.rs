//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end. Nothing here reaches a
//! language model.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serial_test::serial;

/// Get the binary to test, isolated from the caller's environment.
fn outfit(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("outfit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("MAX_ATTEMPTS")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path());
    cmd
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gender-consistent"));
}

#[test]
fn test_version_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help_lists_options() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-attempts"))
        .stdout(predicate::str::contains("--format"));
}

// ============================================================================
// Graph Tests
// ============================================================================

#[test]
fn test_graph_prints_mermaid() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph TD;"))
        .stdout(predicate::str::contains("validate -. give_up .-> finish;"));
}

#[test]
fn test_graph_writes_markdown() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir).args(["graph", "--output", "workflow_graph.md"]).assert().success();

    dir.child("workflow_graph.md").assert(predicate::str::starts_with("```mermaid\n"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 5"))
        .stdout(predicate::str::contains("provider = \"claude\""));
}

#[test]
fn test_config_reads_local_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".outfit.toml").write_str("[workflow]\nmax_attempts = 2\n").unwrap();

    outfit(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 2"));

    outfit(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".outfit.toml"));
}

#[test]
fn test_config_explicit_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("custom.toml");
    file.write_str("[ai]\nprovider = \"ollama\"\n").unwrap();

    outfit(&dir)
        .args(["--config", file.path().to_str().unwrap(), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider = \"ollama\""));
}

#[test]
fn test_config_invalid_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".outfit.toml").write_str("[workflow\nmax_attempts = ").unwrap();

    outfit(&dir).arg("config").assert().failure().stderr(predicate::str::contains("Invalid config"));
}

#[test]
#[serial]
fn test_max_attempts_env_override() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .env("MAX_ATTEMPTS", "9")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 9"));
}

#[test]
#[serial]
fn test_max_attempts_from_dotenv() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".env").write_str("MAX_ATTEMPTS=7\n").unwrap();

    outfit(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 7"));
}

#[test]
#[serial]
fn test_invalid_max_attempts_env_keeps_default() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .env("MAX_ATTEMPTS", "plenty")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 5"));
}

// ============================================================================
// Run Tests
// ============================================================================

#[test]
fn test_run_without_credentials_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_run_unknown_provider_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".outfit.toml").write_str("[ai]\nprovider = \"eliza\"\n").unwrap();

    outfit(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider: eliza"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    let dir = assert_fs::TempDir::new().unwrap();
    outfit(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outfit"));
}
