// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the chatcred credential subsystem.
//!
//! This crate holds the error type shared by every other crate in the
//! workspace and the closed enumerations that describe what a credential is
//! (`CredentialContext`) and where credentials live (`StorageMode`).

pub mod error;
pub mod types;

pub use error::CredentialError;
pub use types::{CredentialContext, StorageMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_error_variants_render() {
        let locked = CredentialError::Locked("no master password set".into());
        assert_eq!(
            locked.to_string(),
            "credentials are locked: no master password set"
        );

        let io = CredentialError::Io {
            path: "/tmp/.credentials".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(io.to_string().contains("/tmp/.credentials"));

        let migration = CredentialError::Migration {
            target: StorageMode::External,
            source: Box::new(CredentialError::Internal("boom".into())),
        };
        let msg = migration.to_string();
        assert!(msg.contains("external"), "{msg}");
        assert!(msg.contains("inconsistent"), "{msg}");
    }

    #[test]
    fn decrypt_error_does_not_reveal_cause() {
        let err = CredentialError::Decrypt;
        assert_eq!(
            err.to_string(),
            "decryption failed -- wrong master password or corrupted value"
        );
    }
}
