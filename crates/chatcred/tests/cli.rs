// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `chatcred` binary.
//!
//! Each test gets its own state directory holding `chatcred.toml` (passed
//! with `--config`) and the main `config.toml`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const MAIN: &str = r#"
[[servers]]
address = "irc.example.org"
chatnet = "example"
password = "server-secret"

[chatnets.example]
sasl_username = "alice"
sasl_password = "sasl-secret"
"#;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = format!(
            "[client]\nstate_dir = \"{}\"\n\n[credential]\nkdf_iterations = 10\n",
            dir.path().display()
        );
        std::fs::write(dir.path().join("chatcred.toml"), settings).unwrap();
        std::fs::write(dir.path().join("config.toml"), MAIN).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).unwrap()
    }

    fn run(&self, args: &[&str], password: Option<&str>) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_chatcred"));
        command
            .arg("--plain")
            .arg("--config")
            .arg(self.path("chatcred.toml"))
            .arg("credential")
            .args(args)
            .env_remove("CHATCRED_MASTER_PASSWORD")
            .env("RUST_LOG", "off");
        if let Some(password) = password {
            command.env("CHATCRED_MASTER_PASSWORD", password);
        }
        command.output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap()
}

// ---- Test 1: status ----

#[test]
fn test_status_json_reports_defaults() {
    let ws = Workspace::new();
    let output = ws.run(&["status", "--json"], None);
    assert_success(&output);

    let text = stdout(&output);
    assert!(text.contains("\"storage_mode\": \"config\""));
    assert!(text.contains("\"config_encrypt\": false"));
    assert!(text.contains("\"master_password_set\": false"));
}

// ---- Test 2: migration ----

#[test]
fn test_migrate_to_external_and_back() {
    let ws = Workspace::new();

    let output = ws.run(&["migrate", "external"], None);
    assert_success(&output);
    assert!(stdout(&output).contains("Migrated"));
    assert!(exists(&ws.path(".credentials")));
    assert!(!ws.read("config.toml").contains("sasl-secret"));
    assert!(ws.read("chatcred.toml").contains("storage_mode = \"external\""));

    let output = ws.run(&["migrate", "external"], None);
    assert_success(&output);
    assert!(stdout(&output).contains("Already using external storage mode."));

    let output = ws.run(&["migrate", "config"], None);
    assert_success(&output);
    assert!(!exists(&ws.path(".credentials")));
    assert!(ws.read("config.toml").contains("sasl-secret"));
    assert!(ws.read("chatcred.toml").contains("storage_mode = \"config\""));
}

// ---- Test 3: encryption ----

#[test]
fn test_encrypt_list_export_decrypt() {
    let ws = Workspace::new();

    let output = ws.run(&["encrypt"], None);
    assert!(!output.status.success());

    let output = ws.run(&["encrypt"], Some("master"));
    assert_success(&output);
    let stored = ws.read("config.toml");
    assert!(!stored.contains("sasl-secret"));
    assert!(!stored.contains("server-secret"));
    assert!(ws.read("chatcred.toml").contains("config_encrypt = true"));

    let output = ws.run(&["list"], None);
    assert!(!output.status.success());

    let output = ws.run(&["list", "--json"], Some("master"));
    assert_success(&output);
    let listing = stdout(&output);
    assert!(listing.contains("\"display\": \"alice\""));
    assert!(!listing.contains("sasl-secret"));

    let output = ws.run(&["export"], Some("master"));
    assert_success(&output);
    assert!(ws.read("config.decrypted.toml").contains("sasl-secret"));
    assert!(!ws.read("config.toml").contains("sasl-secret"));

    let output = ws.run(&["decrypt"], Some("master"));
    assert_success(&output);
    assert!(ws.read("config.toml").contains("sasl-secret"));
    assert!(ws.read("chatcred.toml").contains("config_encrypt = false"));
}
