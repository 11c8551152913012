// CLI integration tests
//
// These only exercise paths that fail or exit before an AWS client is used.

use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn apu(dir: &Path, args: &[&str]) -> Output {
    apu_with_log_level(dir, args, "error")
}

fn apu_with_log_level(dir: &Path, args: &[&str], level: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apu"))
        .args(args)
        .current_dir(dir)
        .env_remove("APU_CONFIG")
        .env_remove("APU_CONFIG_CONTENT")
        .env_remove("APU_INPUT_FILE")
        .env_remove("APU_DRY_RUN")
        .env_remove("APU_FORCE")
        .env_remove("APU_ENDPOINT_URL")
        .env("APU_LOG_LEVEL", level)
        .env("APU_LOG_FORMAT", "text")
        .output()
        .expect("Failed to run binary")
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("update AWS Parameters"));
    assert!(stdout.contains("--filename"));
    assert!(stdout.contains("--name"));
    assert!(stdout.contains("--value"));
    assert!(stdout.contains("--description"));
    assert!(stdout.contains("--secure"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apu"));
}

#[test]
fn test_filename_conflicts_with_single_parameter() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["-f", "parameters.yaml", "-n", "/app/key", "-v", "x"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be used with"));
}

#[test]
fn test_name_requires_value() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["-n", "/app/key"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--value"));
}

#[test]
fn test_missing_input_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let output = apu(dir.path(), &["-f", "does-not-exist.yaml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("E001"));
    assert!(stderr.contains("does-not-exist.yaml"));
    Ok(())
}

#[test]
fn test_invalid_input_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("bad.yaml"), "- name: /app/key\n  colour: blue\n")?;

    let output = apu(dir.path(), &["-f", "bad.yaml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("E002"));
    Ok(())
}

#[test]
fn test_invalid_single_parameter_fails() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["-n", "aws-reserved", "-v", "x"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("E003"));
    assert!(stderr.contains("reserved prefix"));
}

#[test]
fn test_no_input_and_no_default_file() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No input was provided"));
    assert!(stderr.contains("parameters.yaml"));
}

#[test]
fn test_invalid_log_format_fails() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["--log-format", "xml", "-f", "parameters.yaml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid --log-format value"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = apu(dir.path(), &["-c", "missing.toml", "-f", "parameters.yaml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config from missing.toml"));
}

#[test]
fn test_config_file_sets_default_input() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("apu.toml"),
        "[update]\ninput_file = \"custom.yaml\"\n",
    )?;

    let output = apu(dir.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("custom.yaml does not exist"));
    Ok(())
}

#[test]
fn test_config_warnings_are_logged() {
    let dir = TempDir::new().unwrap();
    let output = apu_with_log_level(
        dir.path(),
        &[
            "--dry-run",
            "--force",
            "--endpoint-url",
            "http://localhost:4566",
            "-f",
            "missing.yaml",
        ],
        "warn",
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("update.force has no effect on writes during a dry run"));
    assert!(stderr.contains("aws.endpoint_url uses plain HTTP"));
    assert!(stderr.contains("E001"));
}
