// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moving credential fields between the main document and the external file.
//!
//! Values are treated as opaque: plaintext stays plaintext, ciphertext stays
//! byte-identical. No master password is needed to relocate data. Each file
//! write is atomic, but a migration as a whole is not: a failure part-way is
//! reported and nothing is rolled back.

use std::path::Path;

use chatcred_core::{CredentialContext, CredentialError, StorageMode};
use tracing::{info, warn};

use crate::classifier;
use crate::document::{ConfigTree, Entry, NewEntry, Section, TomlDocument};
use crate::events::Notice;
use crate::external::{non_empty, placement};
use crate::host::ConfigHost;
use crate::manager::CredentialManager;

/// What a migration did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Moved fields, as `<block> <field>`.
    pub moved: Vec<String>,
    /// Non-fatal problems (e.g. the old external file could not be removed).
    pub warnings: Vec<String>,
}

/// Credential fields of one block that are worth moving.
fn movable_fields<T: ConfigTree>(doc: &T, entry: &Entry) -> Vec<(&'static str, String)> {
    CredentialContext::ALL
        .into_iter()
        .filter_map(|context| {
            let (section, field) = placement(context);
            if section != entry.section() {
                return None;
            }
            let value = non_empty(doc.get(entry, field))?;
            if context == CredentialContext::AutoSendCmd
                && !classifier::autosendcmd_is_credential(&value)
            {
                return None;
            }
            Some((field, value))
        })
        .collect()
}

fn block_label<T: ConfigTree>(doc: &T, entry: &Entry) -> String {
    match entry {
        Entry::Chatnet(name) => name.clone(),
        Entry::Server(_) | Entry::Proxy(_) => doc
            .get(entry, "chatnet")
            .or_else(|| doc.get(entry, "address"))
            .unwrap_or_else(|| format!("{entry:?}")),
    }
}

/// Copy credential fields from `raw` (the main document as stored) into
/// `external` and remove them from `live`.
pub fn move_to_external<T: ConfigTree>(
    raw: &T,
    live: &mut T,
    external: &mut TomlDocument,
    report: &mut MigrationReport,
) {
    for section in [Section::Servers, Section::Chatnets, Section::Proxies] {
        for entry in raw.entries(section) {
            let fields = movable_fields(raw, &entry);
            if fields.is_empty() {
                continue;
            }

            let target = match &entry {
                Entry::Server(_) => external.insert(NewEntry::Server),
                Entry::Chatnet(name) => external.insert(NewEntry::Chatnet(name)),
                Entry::Proxy(_) => external.insert(NewEntry::Proxy),
            };
            for key in ["address", "chatnet"] {
                if !matches!(entry, Entry::Chatnet(_))
                    && let Some(value) = raw.get(&entry, key)
                {
                    external.set(&target, key, &value);
                }
            }

            let label = block_label(raw, &entry);
            for (field, value) in fields {
                external.set(&target, field, &value);
                live.remove(&entry, field);
                report.moved.push(format!("{label} {field}"));
            }
        }
    }
}

/// Merge the external file's credential fields into `live`.
///
/// Server and proxy blocks match on `address` or `chatnet` (ASCII
/// case-insensitive); chatnets match by name. Unmatched blocks are created.
pub fn merge_into_config<T: ConfigTree>(
    external: &TomlDocument,
    live: &mut T,
    report: &mut MigrationReport,
) {
    for section in [Section::Servers, Section::Chatnets, Section::Proxies] {
        for entry in external.entries(section) {
            let fields = movable_fields(external, &entry);
            if fields.is_empty() {
                continue;
            }

            let target = match &entry {
                Entry::Chatnet(name) => find_chatnet(live, name)
                    .unwrap_or_else(|| live.insert(NewEntry::Chatnet(name))),
                Entry::Server(_) | Entry::Proxy(_) => {
                    let address = external.get(&entry, "address");
                    let chatnet = external.get(&entry, "chatnet");
                    match find_block(live, section, address.as_deref(), chatnet.as_deref()) {
                        Some(found) => found,
                        None => {
                            let created = live.insert(match section {
                                Section::Proxies => NewEntry::Proxy,
                                _ => NewEntry::Server,
                            });
                            if let Some(address) = &address {
                                live.set(&created, "address", address);
                            }
                            if let Some(chatnet) = &chatnet {
                                live.set(&created, "chatnet", chatnet);
                            }
                            created
                        }
                    }
                }
            };

            let label = block_label(external, &entry);
            for (field, value) in fields {
                live.set(&target, field, &value);
                report.moved.push(format!("{label} {field}"));
            }
        }
    }
}

fn find_chatnet<T: ConfigTree>(doc: &T, name: &str) -> Option<Entry> {
    doc.entries(Section::Chatnets)
        .into_iter()
        .find(|entry| matches!(entry, Entry::Chatnet(n) if n.eq_ignore_ascii_case(name)))
}

fn find_block<T: ConfigTree>(
    doc: &T,
    section: Section,
    address: Option<&str>,
    chatnet: Option<&str>,
) -> Option<Entry> {
    let same = |a: Option<String>, b: Option<&str>| match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    doc.entries(section).into_iter().find(|entry| {
        same(doc.get(entry, "address"), address) || same(doc.get(entry, "chatnet"), chatnet)
    })
}

impl CredentialManager {
    /// Switch storage mode, migrating exactly once per real transition.
    ///
    /// Setting the current mode again only writes the flag. A failed
    /// migration leaves the new mode in place and is reported as
    /// [`CredentialError::Migration`].
    pub fn set_storage_mode<H: ConfigHost>(
        &mut self,
        mode: StorageMode,
        host: &mut H,
    ) -> Result<(), CredentialError> {
        if mode == self.storage_mode {
            return Ok(());
        }
        self.storage_mode = mode;

        let result = match mode {
            StorageMode::External => self.migrate_to_external(host),
            StorageMode::Config => self.migrate_to_config(host),
        };

        match result {
            Ok(report) => {
                info!(target_mode = %mode, moved = report.moved.len(), "credentials migrated");
                let destination = match mode {
                    StorageMode::External => "the external file",
                    StorageMode::Config => "the main config",
                };
                self.notify(Notice::info(format!(
                    "Migrated {} credential field(s) to {destination}.",
                    report.moved.len()
                )));
                for warning in report.warnings {
                    self.notify(Notice::warning(warning));
                }
                Ok(())
            }
            Err(e) => {
                warn!(
                    target_mode = %mode,
                    error = %e,
                    "migration failed, config may be in an inconsistent state"
                );
                self.notify(Notice::error(format!(
                    "Migration failed - config may be in an inconsistent state: {e}"
                )));
                Err(CredentialError::Migration {
                    target: mode,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Move credential fields from the stored main document to a fresh
    /// external file, then save the stripped main document.
    pub fn migrate_to_external<H: ConfigHost>(
        &mut self,
        host: &mut H,
    ) -> Result<MigrationReport, CredentialError> {
        let raw = host.read_raw()?;
        let mut external = TomlDocument::new();
        let mut report = MigrationReport::default();

        move_to_external(&raw, host.document_mut(), &mut external, &mut report);

        external.save(&self.external_file, true)?;
        self.save_main(host)?;
        self.external_load()?;
        Ok(report)
    }

    /// Merge the external file into the main document, save it, and only
    /// then delete the external file.
    pub fn migrate_to_config<H: ConfigHost>(
        &mut self,
        host: &mut H,
    ) -> Result<MigrationReport, CredentialError> {
        let external = TomlDocument::load(&self.external_file)?;
        let mut report = MigrationReport::default();

        merge_into_config(&external, host.document_mut(), &mut report);
        self.save_main(host)?;
        self.after_load(host.document_mut());

        remove_external_file(&self.external_file, &mut report);
        Ok(report)
    }
}

fn remove_external_file(path: &Path, report: &mut MigrationReport) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "external credentials file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove external credentials file");
            report.warnings.push(format!(
                "Failed to remove external credentials file {}: {e}",
                path.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> TomlDocument {
        TomlDocument::parse(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn move_copies_raw_values_and_strips_live() {
        let raw = doc(r#"
[[servers]]
address = "irc.libera.chat"
chatnet = "liberachat"
password = "RAW"

[[servers]]
address = "irc.oftc.net"

[chatnets.liberachat]
sasl_password = "RAWSASL"
autosendcmd = "join #rust"
"#);
        let mut live = raw.clone();
        live.set(&Entry::Server(0), "password", "LIVE");
        let mut external = TomlDocument::new();
        let mut report = MigrationReport::default();

        move_to_external(&raw, &mut live, &mut external, &mut report);

        assert_eq!(report.moved, vec!["liberachat password", "liberachat sasl_password"]);
        assert_eq!(external.get(&Entry::Server(0), "password").as_deref(), Some("RAW"));
        assert_eq!(
            external.get(&Entry::Server(0), "address").as_deref(),
            Some("irc.libera.chat")
        );
        assert_eq!(external.entries(Section::Servers).len(), 1);
        assert_eq!(live.get(&Entry::Server(0), "password"), None);
        assert_eq!(
            live.get(&Entry::Chatnet("liberachat".into()), "autosendcmd").as_deref(),
            Some("join #rust")
        );
    }

    #[test]
    fn merge_matches_existing_blocks_case_insensitively() {
        let external = doc(r#"
[[servers]]
address = "IRC.LIBERA.CHAT"
chatnet = "Libera"
password = "pw"

[[servers]]
address = "irc.new.net"
chatnet = "newnet"
password = "pw2"

[chatnets.LiberaChat]
sasl_username = "alice"

[[proxies]]
address = "bnc.local"
password = "bnc"
"#);
        let mut live = doc(r#"
[[servers]]
address = "irc.libera.chat"
chatnet = "liberachat"
port = 6697

[chatnets.liberachat]
type = "IRC"
"#);
        let mut report = MigrationReport::default();
        merge_into_config(&external, &mut live, &mut report);

        assert_eq!(report.moved.len(), 4);
        assert_eq!(live.entries(Section::Servers).len(), 2);
        assert_eq!(live.get(&Entry::Server(0), "password").as_deref(), Some("pw"));
        assert_eq!(live.get(&Entry::Server(1), "chatnet").as_deref(), Some("newnet"));
        assert_eq!(live.entries(Section::Chatnets).len(), 1);
        assert_eq!(
            live.get(&Entry::Chatnet("liberachat".into()), "sasl_username").as_deref(),
            Some("alice")
        );
        assert_eq!(live.get(&Entry::Proxy(0), "password").as_deref(), Some("bnc"));
    }

    #[test]
    fn missing_external_file_removal_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = MigrationReport::default();
        remove_external_file(&dir.path().join("absent"), &mut report);
        assert!(report.warnings.is_empty());
    }
}
