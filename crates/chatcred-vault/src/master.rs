// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The master password from which every per-value key is derived.

use chatcred_core::CredentialError;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto;

/// Holder of the optional master password and the KDF cost.
///
/// The secret is zeroized when replaced, cleared or dropped. Debug output
/// only says whether it is set.
pub struct MasterPassword {
    secret: Option<SecretString>,
    iterations: u32,
}

impl std::fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterPassword")
            .field("set", &self.is_set())
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl MasterPassword {
    /// An absent master password using `iterations` PBKDF2 rounds.
    pub fn new(iterations: u32) -> Self {
        Self {
            secret: None,
            iterations,
        }
    }

    /// Replace the password. The previous one is zeroized on drop.
    pub fn set(&mut self, password: SecretString) {
        self.secret = Some(password);
    }

    pub fn clear(&mut self) {
        self.secret = None;
    }

    pub fn is_set(&self) -> bool {
        self.secret.is_some()
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    /// Encrypt `plaintext` under the master password.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CredentialError> {
        let secret = self.require()?;
        crypto::encrypt(plaintext, secret.expose_secret().as_bytes(), self.iterations)
    }

    /// Decrypt a serialized value under the master password.
    pub fn decrypt(&self, serialized: &str) -> Result<Zeroizing<String>, CredentialError> {
        let secret = self.require()?;
        crypto::decrypt(serialized, secret.expose_secret().as_bytes(), self.iterations)
    }

    fn require(&self) -> Result<&SecretString, CredentialError> {
        self.secret
            .as_ref()
            .ok_or_else(|| CredentialError::Locked("master password not set".to_string()))
    }
}
