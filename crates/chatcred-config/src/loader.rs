// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatcred.toml` > `~/.config/chatcred/chatcred.toml`
//! > `/etc/chatcred/chatcred.toml` with environment variable overrides via the
//! `CHATCRED_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use tracing::debug;

use crate::model::ChatcredConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/chatcred/chatcred.toml";

/// Per-user configuration file (`<config_dir>/chatcred/chatcred.toml`).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatcred/chatcred.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatcred/chatcred.toml`
/// 3. `~/.config/chatcred/chatcred.toml`
/// 4. `./chatcred.toml`
/// 5. `CHATCRED_*` environment variables
pub fn load_config() -> Result<ChatcredConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChatcredConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatcredConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatcredConfig, figment::Error> {
    debug!(path = %path.display(), present = path.is_file(), "settings file");
    Figment::new()
        .merge(Serialized::defaults(ChatcredConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    let layers = [
        Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
        user_config_path(),
        Some(PathBuf::from("chatcred.toml")),
    ];

    let mut figment = Figment::new().merge(Serialized::defaults(ChatcredConfig::default()));
    for path in layers.into_iter().flatten() {
        debug!(path = %path.display(), present = path.is_file(), "settings layer");
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Environment provider mapping `CHATCRED_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CHATCRED_CREDENTIAL_STORAGE_MODE` must become
/// `credential.storage_mode`, not `credential.storage.mode`.
fn env_provider() -> Env {
    Env::prefixed("CHATCRED_")
        .ignore(&["MASTER_PASSWORD"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("client_", "client.", 1)
                .replacen("credential_", "credential.", 1);
            mapped.into()
        })
}
