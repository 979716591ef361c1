// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layout of the external credentials file.
//!
//! The file mirrors the main configuration document: server-scoped values
//! in `[[servers]]` blocks (`address` and `chatnet` both set to the network),
//! SASL and auto-send values in `[chatnets.<network>]`, proxy passwords in
//! `[[proxies]]`. Values are written exactly as stored.

use std::path::Path;

use chatcred_core::{CredentialContext, CredentialError};
use tracing::debug;

use crate::classifier;
use crate::document::{ConfigTree, Entry, NewEntry, Section, TomlDocument};
use crate::store::CredentialRecord;

/// Section and field name holding values of `context`.
pub fn placement(context: CredentialContext) -> (Section, &'static str) {
    match context {
        CredentialContext::ServerPassword => (Section::Servers, "password"),
        CredentialContext::OperPassword => (Section::Servers, "oper_password"),
        CredentialContext::TlsPassphrase => (Section::Servers, "tls_pass"),
        CredentialContext::SaslUsername => (Section::Chatnets, "sasl_username"),
        CredentialContext::SaslPassword => (Section::Chatnets, "sasl_password"),
        CredentialContext::AutoSendCmd => (Section::Chatnets, classifier::AUTOSENDCMD),
        CredentialContext::ProxyPassword => (Section::Proxies, "password"),
    }
}

/// Contexts stored in `section`.
fn contexts_in(section: Section) -> impl Iterator<Item = (CredentialContext, &'static str)> {
    CredentialContext::ALL.into_iter().filter_map(move |context| {
        let (placed, field) = placement(context);
        (placed == section).then_some((context, field))
    })
}

/// Group records into an external-file document.
pub fn to_document(records: &[CredentialRecord]) -> TomlDocument {
    let mut doc = TomlDocument::new();
    let mut blocks: Vec<(Section, String, Entry)> = Vec::new();

    for record in records {
        let (section, field) = placement(record.context());
        let network = record.network();

        let existing = blocks
            .iter()
            .find(|(s, n, _)| *s == section && n.eq_ignore_ascii_case(network))
            .map(|(_, _, entry)| entry.clone());

        let entry = match existing {
            Some(entry) => entry,
            None => {
                let entry = match section {
                    Section::Servers => {
                        let entry = doc.insert(NewEntry::Server);
                        doc.set(&entry, "address", network);
                        doc.set(&entry, "chatnet", network);
                        entry
                    }
                    Section::Chatnets => doc.insert(NewEntry::Chatnet(network)),
                    Section::Proxies => {
                        let entry = doc.insert(NewEntry::Proxy);
                        doc.set(&entry, "address", network);
                        entry
                    }
                };
                blocks.push((section, network.to_string(), entry.clone()));
                entry
            }
        };

        doc.set(&entry, field, record.value());
    }

    doc
}

/// Extract records from an external-file document, values as stored.
pub fn from_document<T: ConfigTree>(doc: &T) -> Vec<CredentialRecord> {
    let mut records = Vec::new();

    for entry in doc.entries(Section::Servers) {
        let network = non_empty(doc.get(&entry, "chatnet"))
            .or_else(|| non_empty(doc.get(&entry, "address")));
        let Some(network) = network else {
            debug!(?entry, "server block without chatnet or address skipped");
            continue;
        };
        for (context, field) in contexts_in(Section::Servers) {
            if let Some(value) = non_empty(doc.get(&entry, field)) {
                records.push(CredentialRecord::new(network.as_str(), context, value));
            }
        }
    }

    for entry in doc.entries(Section::Chatnets) {
        let Entry::Chatnet(network) = &entry else {
            continue;
        };
        for (context, field) in contexts_in(Section::Chatnets) {
            let Some(value) = non_empty(doc.get(&entry, field)) else {
                continue;
            };
            if context == CredentialContext::AutoSendCmd
                && !classifier::autosendcmd_is_credential(&value)
            {
                continue;
            }
            records.push(CredentialRecord::new(network.as_str(), context, value));
        }
    }

    for entry in doc.entries(Section::Proxies) {
        let Some(address) = non_empty(doc.get(&entry, "address")) else {
            continue;
        };
        for (context, field) in contexts_in(Section::Proxies) {
            if let Some(value) = non_empty(doc.get(&entry, field)) {
                records.push(CredentialRecord::new(address.as_str(), context, value));
            }
        }
    }

    records
}

/// Write `records` to `path` with owner-only permissions.
pub fn save_external(records: &[CredentialRecord], path: &Path) -> Result<(), CredentialError> {
    to_document(records).save(path, true)
}

/// Read records from `path`. A missing file holds no records.
pub fn load_external(path: &Path) -> Result<Vec<CredentialRecord>, CredentialError> {
    Ok(from_document(&TomlDocument::load(path)?))
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CredentialRecord> {
        vec![
            CredentialRecord::new("liberachat", CredentialContext::ServerPassword, "srv"),
            CredentialRecord::new("liberachat", CredentialContext::OperPassword, "oper"),
            CredentialRecord::new("liberachat", CredentialContext::SaslUsername, "alice"),
            CredentialRecord::new("LiberaChat", CredentialContext::SaslPassword, "sasl"),
            CredentialRecord::new(
                "oftc",
                CredentialContext::AutoSendCmd,
                "MSG NickServ identify pw",
            ),
            CredentialRecord::new("bnc.local", CredentialContext::ProxyPassword, "bnc"),
        ]
    }

    #[test]
    fn records_group_into_sections() {
        let doc = to_document(&records());

        assert_eq!(doc.entries(Section::Servers), vec![Entry::Server(0)]);
        let server = Entry::Server(0);
        assert_eq!(doc.get(&server, "address").as_deref(), Some("liberachat"));
        assert_eq!(doc.get(&server, "chatnet").as_deref(), Some("liberachat"));
        assert_eq!(doc.get(&server, "password").as_deref(), Some("srv"));
        assert_eq!(doc.get(&server, "oper_password").as_deref(), Some("oper"));

        // Case-insensitive grouping keeps the first spelling.
        assert_eq!(doc.entries(Section::Chatnets).len(), 2);
        let libera = Entry::Chatnet("liberachat".into());
        assert_eq!(doc.get(&libera, "sasl_password").as_deref(), Some("sasl"));

        assert_eq!(
            doc.get(&Entry::Proxy(0), "address").as_deref(),
            Some("bnc.local")
        );
    }

    #[test]
    fn load_reads_back_saved_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials");
        save_external(&records(), &path).unwrap();

        let loaded = load_external(&path).unwrap();
        assert_eq!(loaded.len(), 6);
        let proxy = loaded
            .iter()
            .find(|r| r.context() == CredentialContext::ProxyPassword)
            .unwrap();
        assert_eq!(proxy.network(), "bnc.local");
        assert_eq!(proxy.value(), "bnc");
    }

    #[test]
    fn harmless_autosendcmd_is_not_loaded() {
        let doc = TomlDocument::parse(
            "[chatnets.oftc]\nautosendcmd = \"join #rust\"\nsasl_username = \"\"\n",
            Path::new(".credentials"),
        )
        .unwrap();
        assert!(from_document(&doc).is_empty());
    }

    #[test]
    fn server_without_chatnet_uses_address() {
        let doc = TomlDocument::parse(
            "[[servers]]\naddress = \"irc.example.org\"\npassword = \"pw\"\n",
            Path::new(".credentials"),
        )
        .unwrap();
        let loaded = from_document(&doc);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].network(), "irc.example.org");
    }
}
