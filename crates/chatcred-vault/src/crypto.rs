// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based AES-256-CBC encryption of individual credential values.
//!
//! Every call to [`encrypt`] draws a fresh 32-byte salt and 16-byte IV from
//! the system CSPRNG, derives a key with PBKDF2-HMAC-SHA256 and serializes
//! the result as `hex(salt):hex(iv):base64(ciphertext)`. The derived key lives
//! in a [`Zeroizing`] buffer and is wiped when the call returns.

use std::num::NonZeroU32;

use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chatcred_core::CredentialError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-CBC initialization vector length in bytes.
pub const IV_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Field separator of the serialized format.
pub const SEPARATOR: char = ':';

const BLOCK_LEN: usize = 16;

/// Fill a fixed-size buffer from the system CSPRNG.
pub fn generate_random_bytes<const N: usize>() -> Result<[u8; N], CredentialError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; N];
    rng.fill(&mut bytes)
        .map_err(|_| CredentialError::Crypto("failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Derive a 32-byte key from `password` and `salt` with PBKDF2-HMAC-SHA256.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CredentialError> {
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        CredentialError::Crypto("PBKDF2 iteration count must be at least 1".to_string())
    })?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        key.as_mut(),
    );
    Ok(key)
}

/// Encrypt `plaintext` under `password` and return the serialized form.
pub fn encrypt(
    plaintext: &str,
    password: &[u8],
    iterations: u32,
) -> Result<String, CredentialError> {
    let salt: [u8; SALT_LEN] = generate_random_bytes()?;
    let iv: [u8; IV_LEN] = generate_random_bytes()?;
    let key = derive_key(password, &salt, iterations)?;

    let cipher = Aes256CbcEnc::new_from_slices(key.as_ref(), &iv)
        .map_err(|e| CredentialError::Crypto(format!("AES-256-CBC init: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    Ok(format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}",
        hex::encode(salt),
        hex::encode(iv),
        BASE64.encode(ciphertext)
    ))
}

/// Decrypt a serialized value produced by [`encrypt`].
///
/// Input without any `:` is legacy plaintext and comes back unchanged.
/// A wrong password and a corrupted ciphertext body both yield
/// [`CredentialError::Decrypt`].
pub fn decrypt(
    serialized: &str,
    password: &[u8],
    iterations: u32,
) -> Result<Zeroizing<String>, CredentialError> {
    if !serialized.contains(SEPARATOR) {
        return Ok(Zeroizing::new(serialized.to_string()));
    }

    let (salt_hex, iv_hex, body) = split_fields(serialized)?;

    let salt = hex::decode(salt_hex)
        .map_err(|_| CredentialError::Malformed("salt is not valid hex".to_string()))?;
    if salt.len() != SALT_LEN {
        return Err(CredentialError::Malformed(format!(
            "salt is {} bytes, expected {SALT_LEN}",
            salt.len()
        )));
    }
    let iv = hex::decode(iv_hex)
        .map_err(|_| CredentialError::Malformed("IV is not valid hex".to_string()))?;
    if iv.len() != IV_LEN {
        return Err(CredentialError::Malformed(format!(
            "IV is {} bytes, expected {IV_LEN}",
            iv.len()
        )));
    }

    let key = derive_key(password, &salt, iterations)?;
    let ciphertext = BASE64.decode(body).map_err(|_| CredentialError::Decrypt)?;

    let cipher = Aes256CbcDec::new_from_slices(key.as_ref(), &iv)
        .map_err(|e| CredentialError::Crypto(format!("AES-256-CBC init: {e}")))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CredentialError::Decrypt)?,
    );

    let text = std::str::from_utf8(&plaintext).map_err(|_| CredentialError::Decrypt)?;
    Ok(Zeroizing::new(text.to_string()))
}

/// Whether `value` has the exact shape of a serialized ciphertext.
///
/// Stricter than the `:` test in [`decrypt`]: a plaintext such as
/// `user:pass` is not mistaken for an already-encrypted value.
pub fn is_ciphertext(value: &str) -> bool {
    let Ok((salt_hex, iv_hex, body)) = split_fields(value) else {
        return false;
    };

    let is_hex_of = |s: &str, len: usize| {
        s.len() == len * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
    };

    is_hex_of(salt_hex, SALT_LEN)
        && is_hex_of(iv_hex, IV_LEN)
        && BASE64
            .decode(body)
            .is_ok_and(|ct| !ct.is_empty() && ct.len() % BLOCK_LEN == 0)
}

fn split_fields(serialized: &str) -> Result<(&str, &str, &str), CredentialError> {
    let mut fields = serialized.splitn(3, SEPARATOR);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(salt), Some(iv), Some(body))
            if !salt.is_empty() && !iv.is_empty() && !body.is_empty() =>
        {
            Ok((salt, iv, body))
        }
        _ => Err(CredentialError::Malformed(
            "expected three non-empty `:`-separated fields".to_string(),
        )),
    }
}
