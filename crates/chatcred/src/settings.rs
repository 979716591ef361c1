// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording changed credential settings in the settings file.
//!
//! Only `credential.storage_mode` and `credential.config_encrypt` are
//! rewritten; every other key in the file is kept.

use std::path::{Path, PathBuf};

use chatcred_core::{CredentialError, StorageMode};
use chatcred_vault::CredentialManager;
use chatcred_vault::document::write_atomic;
use tracing::info;

/// The file to write: the one passed with `--config`, else the per-user file.
fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(chatcred_config::loader::user_config_path)
}

/// Record the manager's storage mode and encryption flag.
pub fn persist(
    explicit: Option<&Path>,
    manager: &CredentialManager,
) -> Result<(), CredentialError> {
    let path = settings_path(explicit).ok_or_else(|| {
        CredentialError::Config(
            "no settings file to record the change in, pass --config".to_string(),
        )
    })?;
    rewrite_credential_settings(&path, manager.storage_mode(), manager.config_encrypt())
}

/// Rewrite the `[credential]` table of the TOML file at `path`.
fn rewrite_credential_settings(
    path: &Path,
    storage_mode: StorageMode,
    config_encrypt: bool,
) -> Result<(), CredentialError> {
    let mut doc: toml::Table = match std::fs::read_to_string(path) {
        Ok(content) => content.parse().map_err(|e: toml::de::Error| CredentialError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(e) => return Err(CredentialError::io(path, e)),
    };

    let section = doc
        .entry("credential")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let Some(table) = section.as_table_mut() else {
        return Err(CredentialError::Config(format!(
            "{}: `credential` is not a table",
            path.display()
        )));
    };
    table.insert(
        "storage_mode".to_string(),
        toml::Value::String(storage_mode.to_string()),
    );
    table.insert(
        "config_encrypt".to_string(),
        toml::Value::Boolean(config_encrypt),
    );

    let content = toml::to_string_pretty(&doc).map_err(|e| CredentialError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, content.as_bytes(), false)?;

    info!(
        path = %path.display(),
        %storage_mode,
        config_encrypt,
        "credential settings recorded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatcred.toml");
        std::fs::write(
            &path,
            "[client]\nlog_level = \"debug\"\n\n[credential]\nkdf_iterations = 5000\n",
        )
        .unwrap();

        rewrite_credential_settings(&path, StorageMode::External, true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config = chatcred_config::load_and_validate_str(&text).unwrap();
        assert_eq!(config.client.log_level, "debug");
        assert_eq!(config.credential.kdf_iterations, 5000);
        assert_eq!(config.credential.storage_mode, StorageMode::External);
        assert!(config.credential.config_encrypt);
    }

    #[test]
    fn rewrite_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chatcred.toml");

        rewrite_credential_settings(&path, StorageMode::Config, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("storage_mode = \"config\""));
        assert!(content.contains("config_encrypt = false"));
    }

    #[test]
    fn rewrite_replaces_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatcred.toml");
        std::fs::write(&path, "[credential]\nstorage_mode = \"config\"\n").unwrap();

        rewrite_credential_settings(&path, StorageMode::External, false).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("chatcred.toml")]);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("storage_mode = \"external\""));
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatcred.toml");
        std::fs::write(&path, "[client]\nlog_level = \"info\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        rewrite_credential_settings(&path, StorageMode::Config, true).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn non_table_credential_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatcred.toml");
        std::fs::write(&path, "credential = 3\n").unwrap();

        assert!(matches!(
            rewrite_credential_settings(&path, StorageMode::Config, false),
            Err(CredentialError::Config(_))
        ));
    }
}
