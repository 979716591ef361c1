// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential manager: one explicit context object owning the store,
//! the master password and the storage settings.
//!
//! Operations are spread over several modules as `impl CredentialManager`
//! blocks: config hooks in [`crate::hooks`], storage migration in
//! [`crate::migration`], the encryption toggle in [`crate::toggle`], host
//! signal handlers in [`crate::signals`] and front-end commands in
//! [`crate::frontend`].

use std::path::{Path, PathBuf};

use chatcred_config::ChatcredConfig;
use chatcred_core::{CredentialContext, CredentialError, StorageMode};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::crypto;
use crate::events::{CredentialEvent, Notice};
use crate::external;
use crate::host::ConfigHost;
use crate::hooks;
use crate::master::MasterPassword;
use crate::store::{CredentialRecord, CredentialStore};

/// The three credential settings plus the KDF cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSettings {
    pub storage_mode: StorageMode,
    /// Resolved path of the external credentials file.
    pub external_file: PathBuf,
    pub config_encrypt: bool,
    pub kdf_iterations: u32,
}

impl CredentialSettings {
    pub fn from_config(config: &ChatcredConfig) -> Self {
        let state_dir = config.client.state_dir_path();
        Self {
            storage_mode: config.credential.storage_mode,
            external_file: config.credential.external_file_path(&state_dir),
            config_encrypt: config.credential.config_encrypt,
            kdf_iterations: config.credential.kdf_iterations,
        }
    }
}

/// Owner of every piece of credential state.
#[derive(Debug)]
pub struct CredentialManager {
    pub(crate) store: CredentialStore,
    pub(crate) master: MasterPassword,
    pub(crate) storage_mode: StorageMode,
    pub(crate) external_file: PathBuf,
    pub(crate) config_encrypt: bool,
    events: Vec<CredentialEvent>,
}

impl CredentialManager {
    /// A manager in the given state, with an empty store and no side effects.
    pub fn new(settings: &CredentialSettings) -> Self {
        Self {
            store: CredentialStore::new(),
            master: MasterPassword::new(settings.kdf_iterations),
            storage_mode: settings.storage_mode,
            external_file: settings.external_file.clone(),
            config_encrypt: settings.config_encrypt,
            events: Vec::new(),
        }
    }

    /// Start up: adopt the settings without migrating, load the external
    /// file when it may hold credentials, and flag locked credentials.
    pub fn init(settings: &CredentialSettings) -> Result<Self, CredentialError> {
        let mut manager = Self::new(settings);

        if manager.storage_mode == StorageMode::External || manager.config_encrypt {
            manager.external_load()?;
        }

        if manager.config_encrypt && !manager.master.is_set() {
            warn!("configuration encryption is on but credentials are locked");
            manager.notify(Notice::warning(
                "Credentials Locked: configuration encryption is ON, but your credentials are \
                 currently LOCKED. Use `chatcred credential passwd` to unlock them.",
            ));
        }

        info!(
            storage_mode = %manager.storage_mode,
            config_encrypt = manager.config_encrypt,
            "credential manager initialized"
        );
        Ok(manager)
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    pub fn external_file(&self) -> &Path {
        &self.external_file
    }

    pub fn config_encrypt(&self) -> bool {
        self.config_encrypt
    }

    pub fn has_master_password(&self) -> bool {
        self.master.is_set()
    }

    /// Replace the master password. The previous one is zeroized.
    pub fn set_master_password(&mut self, password: SecretString) {
        self.master.set(password);
        debug!("master password set");
    }

    pub fn clear_master_password(&mut self) {
        self.master.clear();
        debug!("master password cleared");
    }

    /// Store a credential, encrypting it when encryption is on.
    ///
    /// Without a master password the value is kept as plaintext and a
    /// warning is queued. In external mode the file is rewritten.
    pub fn set(
        &mut self,
        network: &str,
        context: CredentialContext,
        value: &str,
    ) -> Result<(), CredentialError> {
        self.store_value(network, context, value)?;
        if self.storage_mode == StorageMode::External {
            self.external_save()?;
        }
        Ok(())
    }

    /// Read a credential as plaintext.
    ///
    /// `Ok(None)` when absent. Encrypted values need the master password;
    /// a missing password or failed decryption is logged and returned.
    pub fn get(
        &self,
        network: &str,
        context: CredentialContext,
    ) -> Result<Option<SecretString>, CredentialError> {
        let Some(record) = self.store.find(network, context) else {
            return Ok(None);
        };

        if !crypto::is_ciphertext(record.value()) {
            return Ok(Some(SecretString::from(record.value().to_string())));
        }

        match self.master.decrypt(record.value()) {
            Ok(plaintext) => Ok(Some(SecretString::from(plaintext.as_str().to_string()))),
            Err(e) => {
                warn!(network, %context, error = %e, "cannot read encrypted credential");
                Err(e)
            }
        }
    }

    /// Remove a credential. Returns whether one existed.
    pub fn remove(
        &mut self,
        network: &str,
        context: CredentialContext,
    ) -> Result<bool, CredentialError> {
        let removed = self.store.remove(network, context);
        if removed && self.storage_mode == StorageMode::External {
            self.external_save()?;
        }
        Ok(removed)
    }

    /// Snapshot of every record, values as stored.
    pub fn list(&self) -> Vec<CredentialRecord> {
        self.store.list()
    }

    /// Write the store to the external file.
    pub fn external_save(&self) -> Result<(), CredentialError> {
        external::save_external(self.store.records(), &self.external_file)?;
        debug!(
            path = %self.external_file.display(),
            count = self.store.len(),
            "external credentials saved"
        );
        Ok(())
    }

    /// Replace the store with the external file's content, values as stored.
    pub fn external_load(&mut self) -> Result<(), CredentialError> {
        let records = external::load_external(&self.external_file)?;
        self.store.replace_all(records);
        debug!(
            path = %self.external_file.display(),
            count = self.store.len(),
            "external credentials loaded"
        );
        Ok(())
    }

    pub fn external_reload(&mut self) -> Result<(), CredentialError> {
        self.external_load()
    }

    /// Make stored credentials readable after the master password is set.
    ///
    /// Config mode decrypts the live main document in place; external mode
    /// reloads the external file. Queues [`CredentialEvent::SetupReread`].
    pub fn unlock<H: ConfigHost>(&mut self, host: &mut H) -> Result<(), CredentialError> {
        if !self.master.is_set() {
            return Err(CredentialError::Locked(
                "set the master password before unlocking".to_string(),
            ));
        }

        match self.storage_mode {
            StorageMode::Config => {
                if self.config_encrypt {
                    let decrypted = hooks::decrypt_fields(host.document_mut(), &self.master);
                    debug!(decrypted, "main config credentials decrypted");
                }
            }
            StorageMode::External => {
                if let Err(e) = self.external_load() {
                    warn!(error = %e, "failed to load external credentials after unlocking");
                    self.notify(Notice::error(format!(
                        "Failed to load external credentials after unlocking: {e}"
                    )));
                    return Err(e);
                }
            }
        }

        self.events.push(CredentialEvent::SetupReread);
        info!("credentials unlocked");
        Ok(())
    }

    /// React to edited settings: external file first, then storage mode,
    /// then the encryption flag.
    pub fn apply_settings<H: ConfigHost>(
        &mut self,
        settings: &CredentialSettings,
        host: &mut H,
    ) -> Result<(), CredentialError> {
        self.set_external_file(settings.external_file.clone());
        self.master.set_iterations(settings.kdf_iterations);
        let migrated = self.set_storage_mode(settings.storage_mode, host);
        self.set_config_encrypt(settings.config_encrypt)?;
        migrated
    }

    pub fn set_external_file(&mut self, path: PathBuf) {
        if path != self.external_file {
            debug!(path = %path.display(), "external credentials file changed");
            self.external_file = path;
        }
    }

    /// Warning to keep showing while encryption is on without a master password.
    pub fn pending_warning(&self) -> Option<&'static str> {
        (self.config_encrypt && !self.master.is_set()).then_some(
            "Configuration encryption is ON but no master password is set. Credentials are \
             locked and new values are stored unencrypted.",
        )
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<CredentialEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop the master password and every record.
    pub fn shutdown(&mut self) {
        self.master.clear();
        self.store.clear();
        self.events.clear();
        info!("credential manager shut down");
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.events.push(CredentialEvent::Notice(notice));
    }

    /// Store without persisting, applying the encryption policy.
    pub(crate) fn store_value(
        &mut self,
        network: &str,
        context: CredentialContext,
        value: &str,
    ) -> Result<(), CredentialError> {
        let stored = if !self.config_encrypt || crypto::is_ciphertext(value) {
            value.to_string()
        } else if self.master.is_set() {
            self.master.encrypt(value)?
        } else {
            warn!(
                network,
                %context,
                "encryption is on but the master password is not set, storing plaintext"
            );
            self.notify(Notice::warning(format!(
                "Encryption is ON but the master password is not set. The {context} for \
                 {network} is stored in plaintext."
            )));
            value.to_string()
        };

        self.store.upsert(network, context, stored);
        debug!(network, %context, "credential stored");
        Ok(())
    }
}
