//! Key derivation and the authenticated cipher behind `enc:` tokens.
//!
//! Key: PBKDF2-HMAC-SHA256 over the deployment secret and a
//! per-deployment salt, derived once per codec.
//!
//! Token: URL-safe base64 of `version || nonce || ciphertext+tag`, where
//! the cipher is AES-256-GCM with a fresh random 96-bit nonce per value.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Length of a freshly generated salt, and the minimum accepted length.
pub const SALT_LEN: usize = 16;

const TOKEN_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Low-level cipher failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    #[error("ciphertext is not valid base64 or is truncated")]
    Malformed,

    #[error("unsupported token version {0}")]
    UnsupportedVersion(u8),

    #[error("authentication failed (wrong key or tampered ciphertext)")]
    Authentication,

    #[error("decrypted value is not valid UTF-8")]
    NotUtf8,

    #[error("encryption failed")]
    Encrypt,
}

/// Why a stored salt could not be parsed.
#[derive(Error, Debug, PartialEq)]
pub enum SaltError {
    #[error("not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("salt must be at least {SALT_LEN} bytes, got {0}")]
    TooShort(usize),
}

/// Per-deployment key-derivation salt.
///
/// Generated once per deployment and stored with its configuration
/// (hex-encoded); every codec for that deployment must use the same salt.
#[derive(Clone, PartialEq, Eq)]
pub struct KeySalt(Vec<u8>);

impl KeySalt {
    /// Generate a fresh random salt.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse a hex-encoded salt of at least [`SALT_LEN`] bytes.
    pub fn from_hex(encoded: &str) -> Result<Self, SaltError> {
        let bytes = hex::decode(encoded.trim())?;
        if bytes.len() < SALT_LEN {
            return Err(SaltError::TooShort(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for KeySalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeySalt").field(&self.to_hex()).finish()
    }
}

/// AES-256-GCM keyed from a derived secret.
pub(crate) struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    /// Derive the symmetric key. Deliberately slow; call once per codec.
    pub(crate) fn derive(secret: &str, salt: &KeySalt) -> Self {
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut key);
        let aead = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { aead }
    }

    /// Encrypt a plaintext into a URL-safe token (without the `enc:` prefix).
    pub(crate) fn seal(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut raw = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        raw.push(TOKEN_VERSION);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(raw))
    }

    /// Decrypt a token produced by [`Cipher::seal`].
    pub(crate) fn open(&self, token: &str) -> Result<String, CipherError> {
        let raw = URL_SAFE.decode(token.trim()).map_err(|_| CipherError::Malformed)?;
        let Some((&version, rest)) = raw.split_first() else {
            return Err(CipherError::Malformed);
        };
        if version != TOKEN_VERSION {
            return Err(CipherError::UnsupportedVersion(version));
        }
        if rest.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Malformed);
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Authentication)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
    }
}
