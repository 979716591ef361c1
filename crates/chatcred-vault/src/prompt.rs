// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or CHATCRED_MASTER_PASSWORD.

use chatcred_core::CredentialError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "CHATCRED_MASTER_PASSWORD";

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `CHATCRED_MASTER_PASSWORD` environment variable (for scripts and services)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, CredentialError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let password = read_hidden("Master password: ")?;
        if password.is_empty() {
            return Err(CredentialError::Locked("empty master password not allowed".to_string()));
        }
        return Ok(SecretString::from(password));
    }

    Err(not_provided())
}

/// Get a new master password, prompting twice on a TTY.
pub fn get_master_password_with_confirm() -> Result<SecretString, CredentialError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = zeroize::Zeroizing::new(read_hidden("Master password: ")?);
        let second = zeroize::Zeroizing::new(read_hidden("Confirm master password: ")?);

        if *first != *second {
            return Err(CredentialError::Locked("master passwords do not match".to_string()));
        }
        if first.is_empty() {
            return Err(CredentialError::Locked("empty master password not allowed".to_string()));
        }
        return Ok(SecretString::from(first.to_string()));
    }

    Err(not_provided())
}

fn from_env() -> Option<SecretString> {
    std::env::var(MASTER_PASSWORD_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_hidden(prompt: &str) -> Result<String, CredentialError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| CredentialError::Internal(format!("failed to read master password: {e}")))
}

fn not_provided() -> CredentialError {
    CredentialError::Locked(format!(
        "no master password provided. Set {MASTER_PASSWORD_ENV_VAR} or run interactively."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn password_from_env_var() {
        // SAFETY: test-only env mutation, serialized with other env tests.
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "from-env") };
        let result = get_master_password();
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "from-env");
    }

    #[test]
    #[serial]
    fn confirm_variant_accepts_env_var() {
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "from-env") };
        let result = get_master_password_with_confirm();
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "") };
        // Test stdin is not a terminal, so nothing else can supply it.
        let result = get_master_password();
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        assert!(matches!(result, Err(CredentialError::Locked(_))));
    }
}
