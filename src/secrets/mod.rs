//! Encryption at rest for sensitive configuration fields.
//!
//! A field is encrypted when its key name contains one of
//! [`SENSITIVE_PATTERNS`] (case-insensitive), its value is a non-empty
//! string, and the value is neither already `enc:`-prefixed nor a `${...}`
//! environment reference. Document shape is preserved exactly.
//!
//! Decryption turns every `enc:` string back into plaintext and fails with
//! the field's path (`providers[0].config.api_key`) when it cannot.

pub mod cipher;

use serde_json::Value;
use thiserror::Error;

use crate::constants::{ENCRYPTED_PREFIX, ENV_SECRET_KEY, ENV_SECRET_SALT};
use crate::env::Env;
use crate::expand::is_env_reference;
use crate::models::Document;

pub use cipher::{CipherError, KeySalt, SaltError};

/// Substrings that mark a field name as sensitive.
pub const SENSITIVE_PATTERNS: &[&str] = &[
    "api_key",
    "secret",
    "password",
    "token",
    "credential",
    "private_key",
    "access_key",
];

/// Errors from codec construction or document encryption.
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("no encryption key configured: pass a secret key or set {}", ENV_SECRET_KEY)]
    MissingKey,

    #[error(
        "no key-derivation salt configured: pass a salt or set {} (generate one with `mountplan secrets salt`)",
        ENV_SECRET_SALT
    )]
    MissingSalt,

    #[error("invalid key-derivation salt: {0}")]
    InvalidSalt(#[from] SaltError),

    #[error("failed to encrypt field '{path}': {source}")]
    Encrypt { path: String, source: CipherError },

    #[error("failed to decrypt field '{path}': {source}")]
    Decrypt { path: String, source: CipherError },
}

/// Returns `true` if a field name should hold an encrypted value.
pub fn is_sensitive_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Returns `true` if the value carries the `enc:` marker.
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Decide whether a string under `key` gets encrypted.
fn should_encrypt(key: &str, value: &str) -> bool {
    !value.is_empty() && is_sensitive_field(key) && !is_encrypted(value) && !is_env_reference(value)
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Symmetric codec for sensitive configuration values.
///
/// The key is derived once at construction (an expensive PBKDF2 run), so
/// build one codec and reuse it. Once built it is immutable and can be
/// shared across threads.
pub struct SecretsCodec {
    cipher: cipher::Cipher,
}

impl std::fmt::Debug for SecretsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsCodec").field("key", &"[REDACTED]").finish()
    }
}

impl SecretsCodec {
    /// Build a codec from an explicit secret and salt.
    pub fn new(secret_key: &str, salt: &KeySalt) -> Result<Self, SecretsError> {
        if secret_key.is_empty() {
            return Err(SecretsError::MissingKey);
        }
        Ok(Self {
            cipher: cipher::Cipher::derive(secret_key, salt),
        })
    }

    /// Build a codec, falling back to the environment for missing material.
    ///
    /// An explicit, non-empty `secret_key` wins over `MOUNTPLAN_SECRET_KEY`;
    /// an explicit `salt` wins over `MOUNTPLAN_SECRET_SALT`. Missing key
    /// material is an error here, before any encrypt/decrypt call.
    pub fn from_env(
        secret_key: Option<&str>,
        salt: Option<&KeySalt>,
        env: &Env,
    ) -> Result<Self, SecretsError> {
        let secret = match secret_key.filter(|k| !k.is_empty()) {
            Some(k) => k.to_string(),
            None => env.non_empty(ENV_SECRET_KEY).ok_or(SecretsError::MissingKey)?,
        };

        let salt = match salt {
            Some(s) => s.clone(),
            None => {
                let encoded = env.non_empty(ENV_SECRET_SALT).ok_or(SecretsError::MissingSalt)?;
                KeySalt::from_hex(&encoded)?
            }
        };

        Self::new(&secret, &salt)
    }

    /// Encrypt a single plaintext into an `enc:` value.
    pub fn encrypt_value(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(format!("{ENCRYPTED_PREFIX}{}", self.cipher.seal(plaintext)?))
    }

    /// Decrypt a single value; values without the `enc:` marker pass through.
    pub fn decrypt_value(&self, value: &str) -> Result<String, CipherError> {
        match value.strip_prefix(ENCRYPTED_PREFIX) {
            Some(token) => self.cipher.open(token),
            None => Ok(value.to_string()),
        }
    }

    /// Encrypt every qualifying sensitive field in a document.
    pub fn encrypt_config(&self, doc: &Document) -> Result<Document, SecretsError> {
        self.encrypt_map(doc, "")
    }

    /// Decrypt every `enc:` value in a document.
    pub fn decrypt_config(&self, doc: &Document) -> Result<Document, SecretsError> {
        self.decrypt_map(doc, "")
    }

    fn encrypt_map(&self, map: &Document, path: &str) -> Result<Document, SecretsError> {
        map.iter()
            .map(|(key, value)| -> Result<(String, Value), SecretsError> {
                let path = child_path(path, key);
                let out = match value {
                    Value::String(s) if should_encrypt(key, s) => Value::String(
                        self.encrypt_value(s)
                            .map_err(|source| SecretsError::Encrypt { path, source })?,
                    ),
                    Value::Object(inner) => Value::Object(self.encrypt_map(inner, &path)?),
                    Value::Array(items) => Value::Array(self.encrypt_list(items, &path)?),
                    other => other.clone(),
                };
                Ok((key.clone(), out))
            })
            .collect()
    }

    /// List items have no field name of their own, so only containers
    /// inside a list are searched; bare strings are left alone.
    fn encrypt_list(&self, items: &[Value], path: &str) -> Result<Vec<Value>, SecretsError> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(inner) => self
                    .encrypt_map(inner, &index_path(path, i))
                    .map(Value::Object),
                Value::Array(nested) => self
                    .encrypt_list(nested, &index_path(path, i))
                    .map(Value::Array),
                other => Ok(other.clone()),
            })
            .collect()
    }

    fn decrypt_map(&self, map: &Document, path: &str) -> Result<Document, SecretsError> {
        map.iter()
            .map(|(key, value)| {
                self.decrypt_any(value, child_path(path, key))
                    .map(|v| (key.clone(), v))
            })
            .collect()
    }

    fn decrypt_any(&self, value: &Value, path: String) -> Result<Value, SecretsError> {
        match value {
            Value::String(s) if is_encrypted(s) => self
                .decrypt_value(s)
                .map(Value::String)
                .map_err(|source| SecretsError::Decrypt { path, source }),
            Value::Object(inner) => Ok(Value::Object(self.decrypt_map(inner, &path)?)),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.decrypt_any(item, index_path(&path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}
