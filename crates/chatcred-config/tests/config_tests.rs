// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the chatcred configuration system.

use chatcred_config::diagnostic::ConfigError;
use chatcred_config::{load_and_validate_str, load_config_from_str};
use chatcred_core::StorageMode;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[client]
state_dir = "/home/user/.chat"
main_config = "config"
log_level = "debug"

[credential]
storage_mode = "external"
external_file = ".secrets"
config_encrypt = true
kdf_iterations = 200000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.client.state_dir.as_deref(), Some("/home/user/.chat"));
    assert_eq!(config.client.main_config, "config");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.credential.storage_mode, StorageMode::External);
    assert_eq!(config.credential.external_file, ".secrets");
    assert!(config.credential.config_encrypt);
    assert_eq!(config.credential.kdf_iterations, 200_000);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.credential.storage_mode, StorageMode::Config);
    assert_eq!(config.credential.external_file, ".credentials");
    assert!(!config.credential.config_encrypt);
}

/// Unknown field in [credential] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_credential_key_suggests_correction() {
    let toml = r#"
[credential]
config_encrpyt = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "config_encrpyt");
            assert_eq!(suggestion.as_deref(), Some("config_encrypt"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// An unsupported storage mode is rejected.
#[test]
fn unknown_storage_mode_is_rejected() {
    let toml = r#"
[credential]
storage_mode = "keychain"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject mode");
    let rendered = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(rendered.contains("storage_mode") || rendered.contains("keychain"), "{rendered}");
}

/// Wrong value type produces a diagnostic naming the key.
#[test]
fn wrong_type_for_encrypt_flag() {
    let toml = r#"
[credential]
config_encrypt = "yes please"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject type");
    let rendered = errors[0].to_string();
    assert!(rendered.contains("config_encrypt"), "{rendered}");
}

/// Semantic validation runs after a successful parse.
#[test]
fn zero_iterations_fail_validation() {
    let toml = r#"
[credential]
kdf_iterations = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}
