//! CLI Integration Tests
//!
//! Runs the built `account-server` binary inside temporary directories.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_account_server(args: &[&str], working_dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_account-server"))
        .args(args)
        .current_dir(working_dir)
        .env_remove("APPLICATION_NAME")
        .env_remove("LOGIN_EXPIRATION_DURATION")
        .env_remove("DATABASE_URL")
        .output()
        .expect("Failed to execute command")
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn write_config(dir: &TempDir, public_key: &str) {
    let content = format!(
        r#"
[server]
port = 3999

[auth]
issuer = "account-cli-test"
private_key_path = "{}"
public_key_path = "{}"
password_cost = 4

[database]
url = ":memory:"
"#,
        fixture("id_rsa"),
        public_key
    );
    fs::write(dir.path().join("account.toml"), content).unwrap();
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_account_server(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("account-server"));
    assert!(stdout.contains("hash-password"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_account_server(&["--version"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Utility Command Tests
// =============================================================================

#[test]
fn test_hash_password_without_config_uses_default_cost() {
    let dir = TempDir::new().unwrap();
    let output = run_account_server(&["hash-password", "Asdasd123#"], dir.path());

    assert!(output.status.success());
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(hash.starts_with("$2"));
    assert!(hash.contains("$10$"));
    assert!(bcrypt::verify("Asdasd123#", &hash).unwrap());
}

#[test]
fn test_hash_password_uses_configured_cost() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, &fixture("id_rsa.pub"));

    let output = run_account_server(&["hash-password", "Asdasd123#"], dir.path());

    assert!(output.status.success());
    let hash = String::from_utf8_lossy(&output.stdout);
    assert!(hash.contains("$04$"));
}

#[test]
fn test_openapi_command() {
    let dir = TempDir::new().unwrap();
    let output = run_account_server(&["openapi"], dir.path());

    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["paths"]["/users/login"]["post"].is_object());
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_validate_success() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, &fixture("id_rsa.pub"));

    let output = run_account_server(&["--no-color", "config", "--validate"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("account-cli-test"));
    assert!(stdout.contains("valid"));
}

#[test]
fn test_config_validate_missing_key_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, &fixture("does-not-exist.pub"));

    let output = run_account_server(&["config", "--validate"], dir.path());

    assert!(!output.status.success());
}

#[test]
fn test_config_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_account_server(&["config"], dir.path());

    assert!(!output.status.success());
}
