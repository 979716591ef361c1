// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::{Path, PathBuf};

use chatcred_core::StorageMode;
use serde::{Deserialize, Serialize};

/// Default number of PBKDF2-HMAC-SHA256 iterations.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatcredConfig {
    /// Client paths and logging.
    #[serde(default)]
    pub client: ClientConfig,

    /// Credential storage and encryption settings.
    #[serde(default)]
    pub credential: CredentialConfig,
}

/// Client paths and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Directory holding the main configuration document and the external
    /// credentials file. `None` means `<data_dir>/chatcred`.
    #[serde(default)]
    pub state_dir: Option<String>,

    /// Main configuration document, relative to the state directory.
    #[serde(default = "default_main_config")]
    pub main_config: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            main_config: default_main_config(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Resolved state directory.
    pub fn state_dir_path(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("chatcred"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Resolved path of the main configuration document.
    pub fn main_config_path(&self) -> PathBuf {
        resolve_under(&self.state_dir_path(), &self.main_config)
    }
}

fn default_main_config() -> String {
    "config.toml".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credential storage and encryption settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialConfig {
    /// `config` keeps credentials in the main document, `external` moves
    /// them to `external_file`.
    #[serde(default)]
    pub storage_mode: StorageMode,

    /// External credentials file, relative to the state directory unless
    /// absolute.
    #[serde(default = "default_external_file")]
    pub external_file: String,

    /// Encrypt stored credentials under the master password.
    #[serde(default)]
    pub config_encrypt: bool,

    /// PBKDF2 iteration count. Must match the count in effect when the
    /// stored values were encrypted; it is not recorded alongside them.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            external_file: default_external_file(),
            config_encrypt: false,
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl CredentialConfig {
    /// Resolved external file path under `state_dir`.
    pub fn external_file_path(&self, state_dir: &Path) -> PathBuf {
        resolve_under(state_dir, &self.external_file)
    }
}

fn default_external_file() -> String {
    ".credentials".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn resolve_under(dir: &Path, name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_settings() {
        let config = ChatcredConfig::default();
        assert_eq!(config.credential.storage_mode, StorageMode::Config);
        assert_eq!(config.credential.external_file, ".credentials");
        assert!(!config.credential.config_encrypt);
        assert_eq!(config.credential.kdf_iterations, 100_000);
        assert_eq!(config.client.main_config, "config.toml");
    }

    #[test]
    fn relative_external_file_resolves_under_state_dir() {
        let credential = CredentialConfig::default();
        let path = credential.external_file_path(Path::new("/var/lib/chat"));
        assert_eq!(path, PathBuf::from("/var/lib/chat/.credentials"));
    }

    #[test]
    fn absolute_external_file_is_kept() {
        let credential = CredentialConfig {
            external_file: "/secure/creds".into(),
            ..Default::default()
        };
        assert_eq!(
            credential.external_file_path(Path::new("/var/lib/chat")),
            PathBuf::from("/secure/creds")
        );
    }

    #[test]
    fn explicit_state_dir_is_used_for_main_config() {
        let client = ClientConfig {
            state_dir: Some("/home/u/.chat".into()),
            ..Default::default()
        };
        assert_eq!(
            client.main_config_path(),
            PathBuf::from("/home/u/.chat/config.toml")
        );
    }
}
