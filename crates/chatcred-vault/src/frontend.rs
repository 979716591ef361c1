// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing credential commands.
//!
//! Each command reports through queued notices as well as its return value,
//! so a front end only has to print what [`CredentialManager::drain_events`]
//! hands back.

use std::path::{Path, PathBuf};

use chatcred_core::{CredentialContext, CredentialError, StorageMode};
use serde::Serialize;
use tracing::info;

use crate::crypto;
use crate::events::Notice;
use crate::external;
use crate::hooks;
use crate::host::ConfigHost;
use crate::manager::CredentialManager;

const MASKED: &str = "***";

/// Snapshot of the credential settings and lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub storage_mode: StorageMode,
    pub external_file: PathBuf,
    pub config_encrypt: bool,
    pub master_password_set: bool,
}

/// One credential as shown to the user. Only SASL usernames are shown in
/// clear; every other value is masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialListing {
    pub network: String,
    pub context: CredentialContext,
    pub display: String,
}

impl CredentialManager {
    pub fn status(&self) -> CredentialStatus {
        CredentialStatus {
            storage_mode: self.storage_mode,
            external_file: self.external_file.clone(),
            config_encrypt: self.config_encrypt,
            master_password_set: self.master.is_set(),
        }
    }

    /// List every credential in the active storage.
    ///
    /// Refused while encryption is on and no master password is set.
    pub fn list_credentials<H: ConfigHost>(
        &self,
        host: &H,
    ) -> Result<Vec<CredentialListing>, CredentialError> {
        if self.config_encrypt && !self.master.is_set() {
            return Err(CredentialError::Locked(
                "set the master password to list credentials".to_string(),
            ));
        }

        let records = match self.storage_mode {
            StorageMode::External => external::load_external(&self.external_file)?,
            StorageMode::Config => external::from_document(host.document()),
        };

        Ok(records
            .iter()
            .map(|record| {
                let display = if record.context().is_secret() {
                    MASKED.to_string()
                } else {
                    self.readable(record.value())
                };
                CredentialListing {
                    network: record.network().to_string(),
                    context: record.context(),
                    display,
                }
            })
            .collect())
    }

    /// Ask for a storage mode change, migrating when it is a real change.
    pub fn request_migration<H: ConfigHost>(
        &mut self,
        target: StorageMode,
        host: &mut H,
    ) -> Result<(), CredentialError> {
        if target == self.storage_mode {
            self.notify(Notice::info(format!("Already using {target} storage mode.")));
            return Ok(());
        }

        self.notify(Notice::info(match target {
            StorageMode::External => "Migrating credentials to the external file...",
            StorageMode::Config => "Migrating credentials to the main config...",
        }));
        self.set_storage_mode(target, host)
    }

    /// Turn encryption on. Needs the master password.
    pub fn request_encrypt(&mut self) -> Result<(), CredentialError> {
        self.require_master_password()?;
        if self.config_encrypt {
            self.notify(Notice::info(
                "Encryption is already enabled. Credentials are encrypted.",
            ));
            return Ok(());
        }
        self.notify(Notice::info("Encrypting all credentials..."));
        self.set_config_encrypt(true)
    }

    /// Turn encryption off. Needs the master password.
    pub fn request_decrypt(&mut self) -> Result<(), CredentialError> {
        self.require_master_password()?;
        if !self.config_encrypt {
            self.notify(Notice::info(
                "Encryption is already disabled. Credentials are in plaintext.",
            ));
            return Ok(());
        }
        self.notify(Notice::info("Decrypting all credentials..."));
        self.set_config_encrypt(false)
    }

    /// Write a decrypted copy of the stored main document to `path`, owner-only.
    ///
    /// The stored document and the live one are left untouched.
    pub fn export_decrypted<H: ConfigHost>(
        &mut self,
        host: &H,
        path: &Path,
    ) -> Result<(), CredentialError> {
        if !self.config_encrypt {
            return Err(CredentialError::Config(
                "configuration encryption is off, there is nothing to decrypt".to_string(),
            ));
        }
        self.require_master_password()?;

        let mut doc = host.read_raw()?;
        let decrypted = hooks::decrypt_fields(&mut doc, &self.master);
        host.write_private_copy(&doc, path)?;

        info!(path = %path.display(), decrypted, "decrypted config exported");
        self.notify(Notice::info(format!(
            "Decrypted config written to {}.",
            path.display()
        )));
        Ok(())
    }

    fn require_master_password(&mut self) -> Result<(), CredentialError> {
        if self.master.is_set() {
            return Ok(());
        }
        self.notify(Notice::error(
            "Master password not set. Use `chatcred credential passwd` first.",
        ));
        Err(CredentialError::Locked("master password not set".to_string()))
    }

    /// Plaintext of a stored value, or the stored value when it cannot be read.
    fn readable(&self, value: &str) -> String {
        if crypto::is_ciphertext(value) && self.master.is_set() {
            if let Ok(plaintext) = self.master.decrypt(value) {
                return plaintext.as_str().to_string();
            }
        }
        value.to_string()
    }
}
