//! Integration tests for the issuebot CLI
//! These tests run the actual binary and verify its behavior

mod common;

use common::TestEnvironment;
use std::process::Command;

fn issuebot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_issuebot"))
}

#[test]
fn test_cli_help() {
    let output = issuebot().arg("--help").output().expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_cli_version() {
    let output = issuebot().arg("--version").output().expect("Failed to execute command");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("issuebot"));
}

#[test]
fn test_config_path_honours_explicit_path() {
    let env = TestEnvironment::new();
    let config_path = env.temp_dir.path().join("custom.yml");

    let output = issuebot()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        config_path.display().to_string()
    );
}

#[test]
fn test_config_show_masks_password() {
    let env = TestEnvironment::new();
    let config_path = env.create_test_config(
        r#"
github:
  credentials:
    username: "issuebot"
    password: "super-secret-token"
monitoring:
  repositories:
    - organization: "test"
      name: "test"
"#,
    );

    let output = issuebot()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "show"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("issuebot"));
    assert!(!stdout.contains("super-secret-token"));
    assert!(stdout.contains("********"));
}

#[test]
fn test_run_rejects_config_without_credentials() {
    let env = TestEnvironment::new();
    let config_path = env.create_test_config("monitoring:\n  enabled: false\n");

    let output = issuebot()
        .arg("--config")
        .arg(&config_path)
        .args(["run", "--once"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("credentials"));
}

#[test]
fn test_config_show_output_is_valid_yaml() {
    let env = TestEnvironment::new();
    let config_path = env.create_test_config(
        r#"
github:
  credentials:
    username: "issuebot"
    password: "token"
logging:
  level: "debug"
"#,
    );

    let output = issuebot()
        .arg("--config")
        .arg(&config_path)
        .args(["config", "show"])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Starting issuebot"));
    let shown: serde_yaml::Value = serde_yaml::from_str(&stdout).expect("stdout should be YAML");
    assert_eq!(shown["github"]["credentials"]["username"].as_str(), Some("issuebot"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Starting issuebot"));
}
