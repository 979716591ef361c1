// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential domain enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The category of a stored credential.
///
/// The string form is the name used in status output and on the command
/// line (`server_password`, `sasl_username`, ...). Parsing is ASCII
/// case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CredentialContext {
    ServerPassword,
    SaslUsername,
    SaslPassword,
    ProxyPassword,
    OperPassword,
    #[strum(serialize = "tls_pass")]
    #[serde(rename = "tls_pass")]
    TlsPassphrase,
    #[strum(serialize = "autosendcmd")]
    #[serde(rename = "autosendcmd")]
    AutoSendCmd,
}

impl CredentialContext {
    /// Every context, in declaration order.
    pub const ALL: [CredentialContext; 7] = [
        CredentialContext::ServerPassword,
        CredentialContext::SaslUsername,
        CredentialContext::SaslPassword,
        CredentialContext::ProxyPassword,
        CredentialContext::OperPassword,
        CredentialContext::TlsPassphrase,
        CredentialContext::AutoSendCmd,
    ];

    /// Whether values of this context are secrets that must be masked in
    /// listings. SASL usernames are the only non-secret context.
    pub fn is_secret(self) -> bool {
        match self {
            CredentialContext::SaslUsername => false,
            CredentialContext::ServerPassword
            | CredentialContext::SaslPassword
            | CredentialContext::ProxyPassword
            | CredentialContext::OperPassword
            | CredentialContext::TlsPassphrase
            | CredentialContext::AutoSendCmd => true,
        }
    }
}

/// Where credential-bearing fields live.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum StorageMode {
    /// Embedded in the main configuration document.
    #[default]
    Config,
    /// In a dedicated external file.
    External,
}

impl TryFrom<String> for StorageMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| {
                format!("unknown storage mode `{value}` (expected `config` or `external`)")
            })
    }
}

impl From<StorageMode> for String {
    fn from(mode: StorageMode) -> Self {
        mode.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn context_names_match_settings_vocabulary() {
        let names: Vec<String> = CredentialContext::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "server_password",
                "sasl_username",
                "sasl_password",
                "proxy_password",
                "oper_password",
                "tls_pass",
                "autosendcmd",
            ]
        );
    }

    #[test]
    fn context_parse_is_case_insensitive() {
        assert_eq!(
            CredentialContext::from_str("SASL_PASSWORD").unwrap(),
            CredentialContext::SaslPassword
        );
        assert_eq!(
            CredentialContext::from_str("AutoSendCmd").unwrap(),
            CredentialContext::AutoSendCmd
        );
        assert!(CredentialContext::from_str("api_key").is_err());
    }

    #[test]
    fn only_sasl_username_is_displayable() {
        let visible: Vec<_> = CredentialContext::ALL
            .into_iter()
            .filter(|c| !c.is_secret())
            .collect();
        assert_eq!(visible, vec![CredentialContext::SaslUsername]);
    }

    #[test]
    fn storage_mode_parses_and_displays() {
        assert_eq!(StorageMode::from_str("External").unwrap(), StorageMode::External);
        assert_eq!(StorageMode::from_str("config").unwrap(), StorageMode::Config);
        assert_eq!(StorageMode::External.to_string(), "external");
        assert_eq!(StorageMode::default(), StorageMode::Config);
    }

    #[test]
    fn storage_mode_deserializes_from_toml_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: StorageMode,
        }

        let w: Wrapper = toml::from_str("mode = \"EXTERNAL\"").unwrap();
        assert_eq!(w.mode, StorageMode::External);

        let err = toml::from_str::<Wrapper>("mode = \"cloud\"").err().unwrap();
        assert!(err.to_string().contains("unknown storage mode"), "{err}");
    }
}
