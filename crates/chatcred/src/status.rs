// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatcred credential status` command implementation.

use std::path::{Path, PathBuf};

use chatcred_core::StorageMode;
use chatcred_vault::CredentialManager;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub storage_mode: StorageMode,
    pub main_config: PathBuf,
    pub external_file: PathBuf,
    pub config_encrypt: bool,
    pub master_password_set: bool,
    pub warning: Option<String>,
}

impl StatusResponse {
    fn collect(manager: &CredentialManager, main_config: &Path) -> Self {
        let status = manager.status();
        Self {
            storage_mode: status.storage_mode,
            main_config: main_config.to_path_buf(),
            external_file: status.external_file,
            config_encrypt: status.config_encrypt,
            master_password_set: status.master_password_set,
            warning: manager.pending_warning().map(str::to_string),
        }
    }
}

/// Print the credential settings and lock state.
///
/// If `json` is set, outputs structured JSON for scripting.
pub fn run_status(manager: &CredentialManager, main_config: &Path, json: bool, use_color: bool) {
    let status = StatusResponse::collect(manager, main_config);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_status(&status, use_color);
    }
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  chatcred credential status");
    println!("  {}", "-".repeat(35));
    println!("    Storage:     {}", status.storage_mode);
    println!("    Main config: {}", status.main_config.display());
    if status.storage_mode == StorageMode::External {
        println!("    External:    {}", status.external_file.display());
    }

    if use_color {
        use colored::Colorize;
        if status.config_encrypt {
            println!("    Encryption:  {} {}", "✓".green(), "ON".green());
        } else {
            println!("    Encryption:  {}", "OFF".dimmed());
        }
        if status.master_password_set {
            println!("    Master key:  {} {}", "✓".green(), "SET".green());
        } else if status.config_encrypt {
            println!("    Master key:  {} {}", "✗".red(), "NOT SET".red());
        } else {
            println!("    Master key:  {}", "NOT SET".dimmed());
        }
        if let Some(warning) = &status.warning {
            println!();
            println!("  {} {}", "!".yellow(), warning.yellow());
        }
    } else {
        let encryption = if status.config_encrypt { "ON" } else { "OFF" };
        println!("    Encryption:  {encryption}");
        if status.master_password_set {
            println!("    Master key:  [OK] SET");
        } else if status.config_encrypt {
            println!("    Master key:  [FAIL] NOT SET");
        } else {
            println!("    Master key:  NOT SET");
        }
        if let Some(warning) = &status.warning {
            println!();
            println!("  [WARN] {warning}");
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcred_vault::CredentialSettings;
    use secrecy::SecretString;

    fn manager(encrypt: bool) -> CredentialManager {
        CredentialManager::new(&CredentialSettings {
            storage_mode: StorageMode::External,
            external_file: PathBuf::from("/srv/chat/.credentials"),
            config_encrypt: encrypt,
            kdf_iterations: 10,
        })
    }

    #[test]
    fn status_response_serializes() {
        let status = StatusResponse::collect(&manager(false), Path::new("/srv/chat/config.toml"));
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"storage_mode\":\"external\""));
        assert!(json.contains("\"external_file\":\"/srv/chat/.credentials\""));
        assert!(json.contains("\"warning\":null"));
    }

    #[test]
    fn locked_status_carries_warning() {
        let mut manager = manager(true);
        let status = StatusResponse::collect(&manager, Path::new("config.toml"));
        assert!(!status.master_password_set);
        assert!(status.warning.is_some());

        manager.set_master_password(SecretString::from("pw".to_string()));
        let status = StatusResponse::collect(&manager, Path::new("config.toml"));
        assert!(status.master_password_set);
        assert!(status.warning.is_none());
    }
}
