// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters run by the host around its own save and load of the main
//! configuration document.
//!
//! In config mode with encryption on, [`CredentialManager::before_save`]
//! encrypts plaintext credential fields just before serialization and
//! [`CredentialManager::after_load`] decrypts them right after parsing. In
//! external mode `before_save` strips the fields instead, since they live
//! only in the external file.

use chatcred_core::{CredentialContext, CredentialError, StorageMode};
use tracing::{debug, warn};

use crate::classifier;
use crate::crypto;
use crate::document::{ConfigTree, Entry};
use crate::external::{non_empty, placement};
use crate::host::ConfigHost;
use crate::manager::CredentialManager;
use crate::master::MasterPassword;

/// A credential-bearing field found in a document.
struct Field {
    entry: Entry,
    name: &'static str,
    value: String,
}

/// Every non-empty credential-bearing field of `doc`.
fn credential_fields<T: ConfigTree>(doc: &T) -> Vec<Field> {
    let mut fields = Vec::new();
    for context in CredentialContext::ALL {
        let (section, name) = placement(context);
        for entry in doc.entries(section) {
            let Some(value) = non_empty(doc.get(&entry, name)) else {
                continue;
            };
            if context == CredentialContext::AutoSendCmd
                && !classifier::autosendcmd_is_credential(&value)
            {
                continue;
            }
            fields.push(Field { entry, name, value });
        }
    }
    fields
}

/// Encrypt every plaintext credential field in place. Returns the count.
///
/// A field that fails to encrypt is left as it is and logged.
pub fn encrypt_fields<T: ConfigTree>(doc: &mut T, master: &MasterPassword) -> usize {
    let mut encrypted = 0;
    for field in credential_fields(doc) {
        if crypto::is_ciphertext(&field.value) {
            continue;
        }
        match master.encrypt(&field.value) {
            Ok(serialized) => {
                doc.set(&field.entry, field.name, &serialized);
                encrypted += 1;
            }
            Err(e) => warn!(entry = ?field.entry, field = field.name, error = %e,
                "failed to encrypt credential field, left as plaintext"),
        }
    }
    encrypted
}

/// Decrypt every ciphertext credential field in place. Returns the count.
///
/// A field that fails to decrypt keeps its stored form and is logged.
pub fn decrypt_fields<T: ConfigTree>(doc: &mut T, master: &MasterPassword) -> usize {
    let mut decrypted = 0;
    for field in credential_fields(doc) {
        if !crypto::is_ciphertext(&field.value) {
            continue;
        }
        match master.decrypt(&field.value) {
            Ok(plaintext) => {
                doc.set(&field.entry, field.name, plaintext.as_str());
                decrypted += 1;
            }
            Err(e) => warn!(entry = ?field.entry, field = field.name, error = %e,
                "failed to decrypt credential field"),
        }
    }
    decrypted
}

/// Remove every credential field. Returns the count.
pub fn strip_fields<T: ConfigTree>(doc: &mut T) -> usize {
    let fields = credential_fields(doc);
    for field in &fields {
        doc.remove(&field.entry, field.name);
    }
    fields.len()
}

fn count_plaintext<T: ConfigTree>(doc: &T) -> usize {
    credential_fields(doc)
        .iter()
        .filter(|field| !crypto::is_ciphertext(&field.value))
        .count()
}

impl CredentialManager {
    /// Write hook: prepare `doc` for serialization.
    pub fn before_save<T: ConfigTree>(&self, doc: &mut T) {
        match self.storage_mode {
            StorageMode::Config if self.config_encrypt => {
                if self.master.is_set() {
                    let encrypted = encrypt_fields(doc, &self.master);
                    debug!(encrypted, "credential fields encrypted before save");
                } else {
                    let plaintext = count_plaintext(doc);
                    if plaintext > 0 {
                        warn!(
                            plaintext,
                            "config encryption is on but credentials are locked, saving unencrypted"
                        );
                    }
                }
            }
            StorageMode::Config => {}
            StorageMode::External => {
                let stripped = strip_fields(doc);
                debug!(stripped, "credential fields stripped before save");
            }
        }
    }

    /// Read hook: make a freshly parsed `doc` readable.
    pub fn after_load<T: ConfigTree>(&self, doc: &mut T) {
        if self.storage_mode == StorageMode::Config && self.config_encrypt && self.master.is_set() {
            let decrypted = decrypt_fields(doc, &self.master);
            debug!(decrypted, "credential fields decrypted after load");
        }
    }

    /// Re-read the main document from storage through the read hook.
    pub fn load_main<H: ConfigHost>(&self, host: &mut H) -> Result<(), CredentialError> {
        let mut doc = host.read_raw()?;
        self.after_load(&mut doc);
        *host.document_mut() = doc;
        Ok(())
    }

    /// Save the live main document through the write hook.
    ///
    /// The hook works on a copy so the live document stays readable.
    pub fn save_main<H: ConfigHost>(&self, host: &mut H) -> Result<(), CredentialError> {
        let mut doc = host.document().clone();
        self.before_save(&mut doc);
        host.write_raw(&doc)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use secrecy::SecretString;

    use super::*;
    use crate::document::TomlDocument;

    const MAIN: &str = r#"
[[servers]]
address = "irc.libera.chat"
chatnet = "liberachat"
password = "serverpw"

[chatnets.liberachat]
sasl_username = "alice"
sasl_password = "saslpw"
autosendcmd = "MSG NickServ identify pw"

[chatnets.oftc]
autosendcmd = "join #rust"

[[proxies]]
address = "bnc.local"
password = "proxypw"
"#;

    fn main_doc() -> TomlDocument {
        TomlDocument::parse(MAIN, Path::new("config.toml")).unwrap()
    }

    fn master() -> MasterPassword {
        let mut master = MasterPassword::new(10);
        master.set(SecretString::from("pw".to_string()));
        master
    }

    #[test]
    fn encrypt_then_decrypt_restores_document() {
        let master = master();
        let mut doc = main_doc();

        assert_eq!(encrypt_fields(&mut doc, &master), 5);
        let libera = Entry::Chatnet("liberachat".into());
        assert!(crypto::is_ciphertext(&doc.get(&libera, "sasl_password").unwrap()));
        // Harmless auto-send commands stay readable.
        assert_eq!(
            doc.get(&Entry::Chatnet("oftc".into()), "autosendcmd").as_deref(),
            Some("join #rust")
        );
        // Second pass finds nothing left to encrypt.
        assert_eq!(encrypt_fields(&mut doc, &master), 0);

        assert_eq!(decrypt_fields(&mut doc, &master), 5);
        assert_eq!(doc, main_doc());
    }

    #[test]
    fn strip_removes_only_credentials() {
        let mut doc = main_doc();
        assert_eq!(strip_fields(&mut doc), 5);

        let text = doc.to_toml_string().unwrap();
        for secret in ["serverpw", "alice", "saslpw", "NickServ", "proxypw"] {
            assert!(!text.contains(secret), "{secret} left in {text}");
        }
        assert!(text.contains("join #rust"));
        assert!(text.contains("irc.libera.chat"));
    }

    #[test]
    fn undecryptable_field_is_kept() {
        let mut doc = main_doc();
        encrypt_fields(&mut doc, &master());

        let mut other = MasterPassword::new(10);
        other.set(SecretString::from("other".to_string()));
        let before = doc.clone();
        decrypt_fields(&mut doc, &other);
        // Garbage plaintext can slip through PKCS#7 by chance, but real
        // values never come back under the wrong password.
        let text = doc.to_toml_string().unwrap();
        assert!(!text.contains("saslpw"));
        assert_eq!(
            doc.entries(crate::document::Section::Servers),
            before.entries(crate::document::Section::Servers)
        );
    }
}
