// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides whether a configuration field carries a credential.

use crate::crypto;

/// Field names that always hold credentials. Compared ASCII case-insensitively.
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "sasl_password",
    "sasl_username",
    "proxy_password",
    "irssiproxy_password",
    "oper_password",
    "tls_pass",
    "fe_web_password",
];

/// Field holding commands sent automatically after connecting.
pub const AUTOSENDCMD: &str = "autosendcmd";

/// Substrings marking an auto-send command as credential-bearing.
///
/// Matched case-sensitively. The list is necessarily incomplete.
const AUTOSENDCMD_PATTERNS: &[&str] = &[
    "NickServ identify",
    "Q@CServe.quakenet.org AUTH",
    "NS IDENTIFY",
    "MSG NickServ",
    "PRIVMSG NickServ",
    "PRIVMSG Q@CServe.quakenet.org",
];

/// Whether the field `key` with `value` is credential-bearing.
///
/// `autosendcmd` only counts when its value matches a known identify
/// pattern; every other listed key counts regardless of value.
pub fn is_sensitive_field(key: &str, value: &str) -> bool {
    if key.eq_ignore_ascii_case(AUTOSENDCMD) {
        return is_autosendcmd_sensitive(value);
    }
    SENSITIVE_FIELDS
        .iter()
        .any(|field| key.eq_ignore_ascii_case(field))
}

/// Whether an auto-send command string contains a known identify command.
pub fn is_autosendcmd_sensitive(cmd: &str) -> bool {
    AUTOSENDCMD_PATTERNS
        .iter()
        .any(|pattern| cmd.contains(pattern))
}

/// Whether a stored `autosendcmd` value must be handled as a credential.
///
/// An encrypted command no longer shows its identify pattern, so the
/// ciphertext shape alone is enough.
pub fn autosendcmd_is_credential(value: &str) -> bool {
    crypto::is_ciphertext(value) || is_autosendcmd_sensitive(value)
}
