// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal tree-walk interface over configuration documents.
//!
//! Credential handling only needs three sections of a document: a list of
//! server blocks, a table of chatnet blocks keyed by name and a list of proxy
//! blocks. [`ConfigTree`] exposes exactly that, so the host configuration
//! system can keep its own representation. [`TomlDocument`] is the TOML
//! implementation used for the external credentials file and the bundled
//! file-backed host.

use std::io::Write;
use std::path::Path;

use chatcred_core::CredentialError;
use tracing::debug;

/// A credential-bearing section of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `[[servers]]` blocks.
    Servers,
    /// `[chatnets.<name>]` blocks.
    Chatnets,
    /// `[[proxies]]` blocks.
    Proxies,
}

impl Section {
    /// Key of the section in the document root.
    pub fn key(self) -> &'static str {
        match self {
            Section::Servers => "servers",
            Section::Chatnets => "chatnets",
            Section::Proxies => "proxies",
        }
    }
}

/// Handle to one block of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Server(usize),
    Chatnet(String),
    Proxy(usize),
}

impl Entry {
    pub fn section(&self) -> Section {
        match self {
            Entry::Server(_) => Section::Servers,
            Entry::Chatnet(_) => Section::Chatnets,
            Entry::Proxy(_) => Section::Proxies,
        }
    }
}

/// A block to append with [`ConfigTree::insert`].
#[derive(Debug, Clone, Copy)]
pub enum NewEntry<'a> {
    Server,
    /// Returns the existing block when the chatnet is already present.
    Chatnet(&'a str),
    Proxy,
}

/// Field-level access to the credential-bearing sections of a document.
pub trait ConfigTree {
    /// Every block of `section`, in document order.
    fn entries(&self, section: Section) -> Vec<Entry>;

    /// String value of `field` in `entry`. Non-string values read as absent.
    fn get(&self, entry: &Entry, field: &str) -> Option<String>;

    /// Set `field` in `entry`. A missing chatnet block is created; a missing
    /// server or proxy index is ignored.
    fn set(&mut self, entry: &Entry, field: &str, value: &str);

    /// Remove `field` from `entry`, returning the previous string value.
    fn remove(&mut self, entry: &Entry, field: &str) -> Option<String>;

    /// Append a block (or find the named chatnet block) and return its handle.
    fn insert(&mut self, entry: NewEntry<'_>) -> Entry;
}

/// A TOML configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TomlDocument {
    root: toml::Table,
}

impl TomlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from TOML text.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, CredentialError> {
        let root = content.parse::<toml::Table>().map_err(|e| CredentialError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    /// Load a document from disk. A missing file is an empty document.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "document does not exist, starting empty");
                Ok(Self::new())
            }
            Err(e) => Err(CredentialError::io(path, e)),
        }
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, CredentialError> {
        toml::to_string_pretty(&self.root).map_err(|e| {
            CredentialError::Internal(format!("failed to serialize document: {e}"))
        })
    }

    /// Atomically replace `path` with this document.
    ///
    /// With `private` the file is owner read/write only. Otherwise an
    /// existing file keeps its permissions.
    pub fn save(&self, path: &Path, private: bool) -> Result<(), CredentialError> {
        let content = self.to_toml_string()?;
        write_atomic(path, content.as_bytes(), private)
    }

    /// Whether none of the credential sections holds a block.
    pub fn is_empty(&self) -> bool {
        [Section::Servers, Section::Chatnets, Section::Proxies]
            .into_iter()
            .all(|section| self.entries(section).is_empty())
    }

    fn block(&self, entry: &Entry) -> Option<&toml::Table> {
        let section = self.root.get(entry.section().key())?;
        match entry {
            Entry::Server(i) | Entry::Proxy(i) => section.as_array()?.get(*i)?.as_table(),
            Entry::Chatnet(name) => section.as_table()?.get(name)?.as_table(),
        }
    }

    fn block_mut(&mut self, entry: &Entry) -> Option<&mut toml::Table> {
        let section = self.root.get_mut(entry.section().key())?;
        match entry {
            Entry::Server(i) | Entry::Proxy(i) => {
                section.as_array_mut()?.get_mut(*i)?.as_table_mut()
            }
            Entry::Chatnet(name) => section.as_table_mut()?.get_mut(name)?.as_table_mut(),
        }
    }

    fn list_mut(&mut self, section: Section) -> Option<&mut Vec<toml::Value>> {
        self.root
            .entry(section.key())
            .or_insert_with(|| toml::Value::Array(Vec::new()))
            .as_array_mut()
    }

    fn chatnets_mut(&mut self) -> Option<&mut toml::Table> {
        self.root
            .entry(Section::Chatnets.key())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
    }
}

impl ConfigTree for TomlDocument {
    fn entries(&self, section: Section) -> Vec<Entry> {
        let Some(value) = self.root.get(section.key()) else {
            return Vec::new();
        };
        match section {
            Section::Servers | Section::Proxies => value
                .as_array()
                .map(|blocks| {
                    blocks
                        .iter()
                        .enumerate()
                        .filter(|(_, block)| block.is_table())
                        .map(|(i, _)| match section {
                            Section::Proxies => Entry::Proxy(i),
                            _ => Entry::Server(i),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Section::Chatnets => value
                .as_table()
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter(|(_, block)| block.is_table())
                        .map(|(name, _)| Entry::Chatnet(name.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn get(&self, entry: &Entry, field: &str) -> Option<String> {
        self.block(entry)?
            .get(field)?
            .as_str()
            .map(str::to_string)
    }

    fn set(&mut self, entry: &Entry, field: &str, value: &str) {
        if let Entry::Chatnet(name) = entry
            && let Some(chatnets) = self.chatnets_mut()
        {
            chatnets
                .entry(name.as_str())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        }
        match self.block_mut(entry) {
            Some(block) => {
                block.insert(field.to_string(), toml::Value::String(value.to_string()));
            }
            None => debug!(?entry, field, "no such block, value not set"),
        }
    }

    fn remove(&mut self, entry: &Entry, field: &str) -> Option<String> {
        let block = self.block_mut(entry)?;
        match block.remove(field)? {
            toml::Value::String(value) => Some(value),
            other => {
                // Not a string field; put it back untouched.
                block.insert(field.to_string(), other);
                None
            }
        }
    }

    fn insert(&mut self, entry: NewEntry<'_>) -> Entry {
        match entry {
            NewEntry::Chatnet(name) => {
                if let Some(chatnets) = self.chatnets_mut() {
                    chatnets
                        .entry(name)
                        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
                }
                Entry::Chatnet(name.to_string())
            }
            NewEntry::Server | NewEntry::Proxy => {
                let section = match entry {
                    NewEntry::Proxy => Section::Proxies,
                    _ => Section::Servers,
                };
                let index = match self.list_mut(section) {
                    Some(list) => {
                        list.push(toml::Value::Table(toml::Table::new()));
                        list.len() - 1
                    }
                    None => usize::MAX,
                };
                match section {
                    Section::Proxies => Entry::Proxy(index),
                    _ => Entry::Server(index),
                }
            }
        }
    }
}

/// Write `content` to a sibling temp file and rename it over `path`.
pub fn write_atomic(path: &Path, content: &[u8], private: bool) -> Result<(), CredentialError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| CredentialError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CredentialError::io(dir, e))?;
    set_permissions(tmp.as_file(), path, private)?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CredentialError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| CredentialError::io(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_permissions(
    file: &std::fs::File,
    path: &Path,
    private: bool,
) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = if private {
        std::fs::Permissions::from_mode(0o600)
    } else {
        match std::fs::metadata(path) {
            Ok(meta) => meta.permissions(),
            Err(_) => std::fs::Permissions::from_mode(0o644),
        }
    };
    file.set_permissions(permissions)
        .map_err(|e| CredentialError::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(
    _file: &std::fs::File,
    _path: &Path,
    _private: bool,
) -> Result<(), CredentialError> {
    Ok(())
}
