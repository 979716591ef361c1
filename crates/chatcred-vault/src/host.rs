// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The host configuration system, as seen from the credential subsystem.

use std::path::{Path, PathBuf};

use chatcred_core::CredentialError;

use crate::document::{ConfigTree, TomlDocument};

/// Owner of the main configuration document.
///
/// The host keeps a live in-memory document and its durable copy. The
/// credential subsystem reads the durable copy directly during migration
/// and hands back documents that already went through
/// [`crate::CredentialManager::before_save`].
pub trait ConfigHost {
    type Document: ConfigTree + Clone;

    /// The main document as stored, without any read hook applied.
    fn read_raw(&self) -> Result<Self::Document, CredentialError>;

    /// The live document.
    fn document(&self) -> &Self::Document;

    fn document_mut(&mut self) -> &mut Self::Document;

    /// Persist `doc` as the main document.
    fn write_raw(&mut self, doc: &Self::Document) -> Result<(), CredentialError>;

    /// Write `doc` to `path`, owner-readable only.
    fn write_private_copy(&self, doc: &Self::Document, path: &Path) -> Result<(), CredentialError>;
}

/// A host whose main document is a TOML file.
#[derive(Debug, Clone)]
pub struct FileConfigHost {
    path: PathBuf,
    live: TomlDocument,
}

impl FileConfigHost {
    /// Load the main document from `path` as-is. A missing file is empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let live = TomlDocument::load(&path)?;
        Ok(Self { path, live })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigHost for FileConfigHost {
    type Document = TomlDocument;

    fn read_raw(&self) -> Result<TomlDocument, CredentialError> {
        TomlDocument::load(&self.path)
    }

    fn document(&self) -> &TomlDocument {
        &self.live
    }

    fn document_mut(&mut self) -> &mut TomlDocument {
        &mut self.live
    }

    fn write_raw(&mut self, doc: &TomlDocument) -> Result<(), CredentialError> {
        doc.save(&self.path, false)
    }

    fn write_private_copy(&self, doc: &TomlDocument, path: &Path) -> Result<(), CredentialError> {
        doc.save(path, true)
    }
}
