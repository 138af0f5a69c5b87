//! Retrieval key generation.
//!
//! Keys are 32 bytes from the operating system CSPRNG, encoded as URL-safe
//! base64 without padding so they can sit in a URL path segment unescaped.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::fmt;

use super::StoreError;

/// Number of random bytes behind every key.
pub const KEY_BYTES: usize = 32;

/// Opaque retrieval key handed back by [`SecretStore::store`](super::SecretStore::store).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix that is safe to put in logs.
    pub fn redacted(&self) -> &str {
        redact(&self.0)
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({}…)", self.redacted())
    }
}

impl From<SecretKey> for String {
    fn from(key: SecretKey) -> Self {
        key.0
    }
}

/// First eight bytes of a caller-supplied key, or all of it if shorter or not
/// cut on a char boundary.
pub(crate) fn redact(key: &str) -> &str {
    key.get(..8).unwrap_or(key)
}

/// Generate a fresh key.
///
/// Fails only if the OS random source fails; there is no fallback.
pub fn new_key() -> Result<SecretKey, StoreError> {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(SecretKey(URL_SAFE_NO_PAD.encode(bytes)))
}
