// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the chatcred credential subsystem.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::StorageMode;

/// The error type returned by every fallible credential operation.
///
/// Wrong-key failures and corrupted ciphertext both surface as
/// [`CredentialError::Decrypt`] so callers cannot use the error as an oracle
/// for password correctness.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A serialized value has the wrong shape (field count, hex, lengths).
    #[error("malformed credential value: {0}")]
    Malformed(String),

    /// An operation needs the master password but none is set.
    #[error("credentials are locked: {0}")]
    Locked(String),

    /// Decryption failed: wrong master password or corrupted ciphertext.
    #[error("decryption failed -- wrong master password or corrupted value")]
    Decrypt,

    /// Random generation, key derivation or cipher setup failed.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be parsed or serialized.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Invalid settings or a rejected settings transition.
    #[error("configuration error: {0}")]
    Config(String),

    /// A storage migration stopped part-way. Nothing is rolled back.
    #[error("migration to {target} storage failed, credentials may be inconsistent: {source}")]
    Migration {
        target: StorageMode,
        #[source]
        source: Box<CredentialError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CredentialError {
    /// Build an [`CredentialError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
