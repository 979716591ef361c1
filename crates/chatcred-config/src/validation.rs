// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::ChatcredConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatcredConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.credential.external_file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "credential.external_file must not be empty".to_string(),
        });
    }

    if config.credential.kdf_iterations == 0 {
        errors.push(ConfigError::Validation {
            message: "credential.kdf_iterations must be at least 1".to_string(),
        });
    }

    if config.client.main_config.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "client.main_config must not be empty".to_string(),
        });
    }

    // Migration to external storage would truncate the main document.
    if !config.client.main_config.trim().is_empty() {
        let state_dir = config.client.state_dir_path();
        let external = config.credential.external_file_path(&state_dir);
        if same_path(&external, &config.client.main_config_path()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "credential.external_file `{}` must differ from client.main_config",
                    config.credential.external_file
                ),
            });
        }
    }

    if !matches!(
        config.client.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level `{}` is not one of trace, debug, info, warn, error",
                config.client.log_level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}
