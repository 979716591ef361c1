// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings for the chatcred credential subsystem.
//!
//! Settings come from layered TOML files plus `CHATCRED_*` environment
//! variables. Unknown keys are rejected, and every problem found while
//! loading or validating is returned as a miette diagnostic.
//!
//! ```no_run
//! let config = chatcred_config::load_and_validate().expect("settings errors");
//! println!("storage mode: {}", config.credential.storage_mode);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ChatcredConfig;

use std::path::Path;

/// Load settings from the standard file hierarchy and validate them.
pub fn load_and_validate() -> Result<ChatcredConfig, Vec<ConfigError>> {
    checked(loader::load_config(), collect_toml_sources)
}

/// Load settings from one file (plus environment overrides) and validate them.
pub fn load_and_validate_path(path: &Path) -> Result<ChatcredConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load settings from a TOML string and validate them.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChatcredConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or convert the load failure into diagnostics.
/// Sources are only read when there is an error to point into.
fn checked(
    loaded: Result<ChatcredConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ChatcredConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Contents of every settings file that exists, keyed by path.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join("chatcred.toml"))
        .unwrap_or_else(|_| "chatcred.toml".into());

    [
        Some(local),
        loader::user_config_path(),
        Some(loader::SYSTEM_CONFIG_PATH.into()),
    ]
    .into_iter()
    .flatten()
    .filter_map(|path| {
        let content = std::fs::read_to_string(&path).ok()?;
        Some((path.display().to_string(), content))
    })
    .collect()
}
