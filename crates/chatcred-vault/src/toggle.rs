// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk conversion of stored credentials when encryption is switched.

use chatcred_core::{CredentialError, StorageMode};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::events::Notice;
use crate::manager::CredentialManager;
use crate::master::MasterPassword;
use crate::store::CredentialStore;

/// Encrypt every plaintext record. Returns how many were converted.
pub(crate) fn encrypt_all(store: &mut CredentialStore, master: &MasterPassword) -> usize {
    let mut converted = 0;
    for record in store.records_mut() {
        if crypto::is_ciphertext(record.value()) {
            continue;
        }
        match master.encrypt(record.value()) {
            Ok(serialized) => {
                record.replace_value(serialized);
                converted += 1;
                debug!(
                    network = record.network(),
                    context = %record.context(),
                    "credential encrypted"
                );
            }
            Err(e) => warn!(
                network = record.network(),
                context = %record.context(),
                error = %e,
                "failed to encrypt credential"
            ),
        }
    }
    converted
}

/// Decrypt every ciphertext record. Returns how many were converted.
pub(crate) fn decrypt_all(store: &mut CredentialStore, master: &MasterPassword) -> usize {
    let mut converted = 0;
    for record in store.records_mut() {
        if !crypto::is_ciphertext(record.value()) {
            continue;
        }
        match master.decrypt(record.value()) {
            Ok(plaintext) => {
                record.replace_value(plaintext.as_str().to_string());
                converted += 1;
                debug!(
                    network = record.network(),
                    context = %record.context(),
                    "credential decrypted"
                );
            }
            Err(e) => warn!(
                network = record.network(),
                context = %record.context(),
                error = %e,
                "failed to decrypt credential"
            ),
        }
    }
    converted
}

impl CredentialManager {
    /// Switch config encryption on or off.
    ///
    /// With a master password every record is converted, then the external
    /// file is rewritten (external mode) or the user is told to save the
    /// main config. Enabling without a master password only flips the flag
    /// and queues a warning; disabling without one is refused.
    pub fn set_config_encrypt(&mut self, enabled: bool) -> Result<(), CredentialError> {
        if enabled == self.config_encrypt {
            return Ok(());
        }

        if !self.master.is_set() {
            if !enabled {
                return Err(CredentialError::Locked(
                    "the master password is required to disable encryption".to_string(),
                ));
            }
            self.config_encrypt = true;
            warn!("encryption enabled without a master password, credentials stay plaintext");
            self.notify(Notice::warning(
                "You are enabling encryption without a master password. Credentials will NOT \
                 be encrypted until you set one with `chatcred credential passwd`.",
            ));
            return Ok(());
        }

        self.config_encrypt = enabled;
        let (converted, verb) = if enabled {
            (encrypt_all(&mut self.store, &self.master), "encrypted")
        } else {
            (decrypt_all(&mut self.store, &self.master), "decrypted")
        };
        info!(converted, enabled, "config encryption switched");

        match self.storage_mode {
            StorageMode::External => {
                self.external_save()?;
                self.notify(Notice::info(format!(
                    "All credentials {verb} and saved to the external file."
                )));
            }
            StorageMode::Config => {
                self.notify(Notice::info(format!(
                    "All credentials {verb}. Save the main config to write them."
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chatcred_core::CredentialContext;
    use secrecy::SecretString;

    use super::*;
    use crate::events::CredentialEvent;
    use crate::manager::CredentialSettings;

    fn manager(dir: &Path, mode: StorageMode) -> CredentialManager {
        CredentialManager::new(&CredentialSettings {
            storage_mode: mode,
            external_file: dir.join(".credentials"),
            config_encrypt: false,
            kdf_iterations: 10,
        })
    }

    #[test]
    fn same_value_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager(dir.path(), StorageMode::Config);
        manager.set_config_encrypt(false).unwrap();
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn disable_without_password_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager(dir.path(), StorageMode::Config);
        manager.set_config_encrypt(true).unwrap();
        assert!(matches!(
            manager.set_config_encrypt(false),
            Err(CredentialError::Locked(_))
        ));
        assert!(manager.config_encrypt());
    }

    #[test]
    fn external_mode_toggle_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager(dir.path(), StorageMode::External);
        manager.set("net", CredentialContext::ServerPassword, "pw").unwrap();
        manager.set_master_password(SecretString::from("master".to_string()));

        manager.set_config_encrypt(true).unwrap();
        let on_disk = crate::external::load_external(manager.external_file()).unwrap();
        assert!(crypto::is_ciphertext(on_disk[0].value()));

        manager.set_config_encrypt(false).unwrap();
        let on_disk = crate::external::load_external(manager.external_file()).unwrap();
        assert_eq!(on_disk[0].value(), "pw");

        let notices: Vec<_> = manager
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                CredentialEvent::Notice(n) => Some(n.message),
                CredentialEvent::SetupReread => None,
            })
            .collect();
        assert_eq!(notices.len(), 2);
        assert!(notices[1].contains("decrypted"));
    }
}
