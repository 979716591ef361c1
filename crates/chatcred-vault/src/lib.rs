// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential storage for an IRC-style chat client.
//!
//! Credentials (server passwords, SASL logins, credential-bearing
//! auto-send commands, proxy passwords) live either inline in the main
//! config document or in a separate owner-only external file. With
//! configuration encryption on, every value is encrypted at rest with
//! AES-256-CBC under a key derived from the master password.
//!
//! [`CredentialManager`] owns all of it. The host application supplies its
//! main document through [`ConfigHost`] and prints queued
//! [`CredentialEvent`]s.

pub mod classifier;
pub mod crypto;
pub mod document;
pub mod events;
pub mod external;
pub mod frontend;
pub mod hooks;
pub mod host;
pub mod manager;
pub mod master;
pub mod migration;
pub mod prompt;
pub mod signals;
pub mod store;
pub mod toggle;

pub use document::{ConfigTree, Entry, NewEntry, Section, TomlDocument};
pub use events::{CredentialEvent, Notice, NoticeLevel};
pub use frontend::{CredentialListing, CredentialStatus};
pub use host::{ConfigHost, FileConfigHost};
pub use manager::{CredentialManager, CredentialSettings};
pub use master::MasterPassword;
pub use migration::MigrationReport;
pub use prompt::{MASTER_PASSWORD_ENV_VAR, get_master_password, get_master_password_with_confirm};
pub use store::{CredentialRecord, CredentialStore};
