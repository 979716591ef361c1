// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handlers for host events that carry credential fields.
//!
//! All three only act in external mode. In config mode the fields belong
//! to the main document and the config hooks handle them.

use chatcred_core::{CredentialContext, CredentialError, StorageMode};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::classifier;
use crate::document::{ConfigTree, Entry};
use crate::external::non_empty;
use crate::manager::CredentialManager;

const CHATNET_FIELDS: [(&str, CredentialContext); 3] = [
    ("sasl_username", CredentialContext::SaslUsername),
    ("sasl_password", CredentialContext::SaslPassword),
    (classifier::AUTOSENDCMD, CredentialContext::AutoSendCmd),
];

impl CredentialManager {
    /// A chatnet block was read: fill its empty SASL fields from the store.
    ///
    /// Returns whether the block changed, so the host can re-read it once.
    /// Values that cannot be decrypted are skipped.
    pub fn on_chatnet_read<T: ConfigTree>(&self, doc: &mut T, chatnet: &str) -> bool {
        if self.storage_mode == StorageMode::Config {
            return false;
        }

        let entry = Entry::Chatnet(chatnet.to_string());
        let mut changed = false;
        for (field, context) in &CHATNET_FIELDS[..2] {
            if non_empty(doc.get(&entry, field)).is_some() {
                continue;
            }
            if let Ok(Some(value)) = self.get(chatnet, *context) {
                doc.set(&entry, field, value.expose_secret());
                changed = true;
            }
        }

        if changed {
            debug!(chatnet, "chatnet credentials filled from store");
        }
        changed
    }

    /// A chatnet block was saved: move its credential fields into the store.
    pub fn on_chatnet_saved<T: ConfigTree>(
        &mut self,
        doc: &mut T,
        chatnet: &str,
    ) -> Result<(), CredentialError> {
        if self.storage_mode == StorageMode::Config {
            return Ok(());
        }

        let entry = Entry::Chatnet(chatnet.to_string());
        let mut captured = 0;
        for (field, context) in CHATNET_FIELDS {
            let Some(value) = non_empty(doc.get(&entry, field)) else {
                continue;
            };
            if context == CredentialContext::AutoSendCmd
                && !classifier::is_autosendcmd_sensitive(&value)
            {
                continue;
            }
            self.store_value(chatnet, context, &value)?;
            doc.remove(&entry, field);
            captured += 1;
        }

        if captured > 0 {
            debug!(chatnet, captured, "chatnet credentials captured");
            self.external_save()?;
        }
        Ok(())
    }

    /// A server block was saved: move its password into the store, keyed by
    /// the server address.
    pub fn on_server_setup_saved<T: ConfigTree>(
        &mut self,
        doc: &mut T,
        server: &Entry,
    ) -> Result<(), CredentialError> {
        if self.storage_mode == StorageMode::Config {
            return Ok(());
        }

        let Some(address) = non_empty(doc.get(server, "address")) else {
            return Ok(());
        };
        let Some(password) = non_empty(doc.get(server, "password")) else {
            return Ok(());
        };

        self.store_value(&address, CredentialContext::ServerPassword, &password)?;
        doc.remove(server, "password");
        debug!(address, "server password captured");
        self.external_save()
    }
}
