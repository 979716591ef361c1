// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory credential records keyed by (network, context).

use chatcred_core::CredentialContext;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One stored credential.
///
/// `value` is either plaintext or a serialized ciphertext; callers inspect
/// its shape with [`crate::crypto::is_ciphertext`]. Debug output omits it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialRecord {
    network: String,
    #[zeroize(skip)]
    context: CredentialContext,
    value: String,
}

impl CredentialRecord {
    pub fn new(
        network: impl Into<String>,
        context: CredentialContext,
        value: impl Into<String>,
    ) -> Self {
        Self {
            network: network.into(),
            context,
            value: value.into(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn context(&self) -> CredentialContext {
        self.context
    }

    /// The stored form, plaintext or ciphertext.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn replace_value(&mut self, value: String) {
        self.value.zeroize();
        self.value = value;
    }

    fn matches(&self, network: &str, context: CredentialContext) -> bool {
        self.context == context && self.network.eq_ignore_ascii_case(network)
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("network", &self.network)
            .field("context", &self.context)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// The credential collection. At most one record per (network, context);
/// network names compare ASCII case-insensitively.
#[derive(Debug, Default)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, network: &str, context: CredentialContext) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.matches(network, context))
    }

    /// Insert a record, replacing the value of an existing one in place.
    pub fn upsert(&mut self, network: &str, context: CredentialContext, value: String) {
        match self.records.iter_mut().find(|r| r.matches(network, context)) {
            Some(record) => record.replace_value(value),
            None => self
                .records
                .push(CredentialRecord::new(network, context, value)),
        }
    }

    /// Remove a record. Returns whether one existed.
    pub fn remove(&mut self, network: &str, context: CredentialContext) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !r.matches(network, context));
        self.records.len() != before
    }

    /// Snapshot of every record.
    pub fn list(&self) -> Vec<CredentialRecord> {
        self.records.clone()
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut CredentialRecord> {
        self.records.iter_mut()
    }

    /// Replace the whole collection. Later duplicates win.
    pub fn replace_all(&mut self, records: Vec<CredentialRecord>) {
        self.records.clear();
        for record in records {
            self.upsert(record.network(), record.context(), record.value().to_string());
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
