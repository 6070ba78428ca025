//! AES-256-GCM cipher for provider API keys
//!
//! Stored form is `base64(nonce || ciphertext || tag)` with a fresh 96-bit
//! nonce per encryption. The server secret is stretched to 256 bits with
//! SHA-256, so any non-empty string works as a key.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::{DomainError, SecretString};

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCipher([REDACTED])")
    }
}

impl SecretCipher {
    /// Build a cipher from the configured server secret
    pub fn from_secret(secret: &str) -> Result<Self, DomainError> {
        if secret.trim().is_empty() {
            return Err(DomainError::configuration("Encryption key must not be empty"));
        }

        let derived: [u8; 32] = Sha256::digest(secret.as_bytes()).into();

        Ok(Self::from_key_bytes(&derived))
    }

    /// Random key for this process only; anything it encrypts is unreadable after restart
    pub fn ephemeral() -> Self {
        warn!("No encryption key configured, using an ephemeral key");

        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);

        Self::from_key_bytes(&key)
    }

    fn from_key_bytes(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| DomainError::crypto(format!("Encryption failed: {}", e)))?;

        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(output))
    }

    /// Decrypt a stored value; fails on tampering or a wrong key
    pub fn decrypt(&self, encrypted: &str) -> Result<SecretString, DomainError> {
        let bytes = general_purpose::STANDARD
            .decode(encrypted.trim())
            .map_err(|e| DomainError::crypto(format!("Failed to decode encrypted value: {}", e)))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(DomainError::crypto("Encrypted value too short"));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::crypto("Decryption failed: wrong key or corrupted value"))?;

        String::from_utf8(plaintext)
            .map(SecretString::from)
            .map_err(|_| DomainError::crypto("Decrypted value is not valid UTF-8"))
    }
}
