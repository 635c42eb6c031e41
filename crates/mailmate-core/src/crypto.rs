//! Authenticated encryption of small secrets.
//!
//! Token layout before base64: `version || nonce || ciphertext || tag`.
//! The version byte is bound as associated data.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Error, Result};
use crate::keys::SecretKey;

const VERSION: u8 = 1;

fn cipher(key: &SecretKey) -> Result<LessSafeKey> {
    UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map(LessSafeKey::new)
        .map_err(|_| Error::Crypto("invalid key length"))
}

/// Encrypts `plaintext` under a fresh random nonce.
pub(crate) fn seal(key: &SecretKey, plaintext: &[u8]) -> Result<String> {
    let cipher = cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| Error::Crypto("system random source unavailable"))?;

    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce),
            Aad::from([VERSION]),
            &mut in_out,
        )
        .map_err(|_| Error::Crypto("encryption failed"))?;

    let mut token = Vec::with_capacity(1 + NONCE_LEN + in_out.len());
    token.push(VERSION);
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&in_out);
    Ok(URL_SAFE.encode(token))
}

/// Decrypts a token produced by [`seal`].
pub(crate) fn open(key: &SecretKey, token: &str) -> Result<Vec<u8>> {
    let raw = URL_SAFE
        .decode(token.trim())
        .map_err(|_| Error::Decryption("token is not valid base64"))?;

    let (&version, rest) = raw
        .split_first()
        .ok_or(Error::Decryption("token is empty"))?;
    if version != VERSION {
        return Err(Error::Decryption("unsupported token version"));
    }
    if rest.len() < NONCE_LEN + AES_256_GCM.tag_len() {
        return Err(Error::Decryption("token is truncated"));
    }

    let (nonce, sealed) = rest.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce)
        .map_err(|_| Error::Decryption("invalid nonce"))?;

    let mut in_out = sealed.to_vec();
    let plaintext = cipher(key)?
        .open_in_place(nonce, Aad::from([version]), &mut in_out)
        .map_err(|_| Error::Decryption("authentication failed"))?;
    Ok(plaintext.to_vec())
}
