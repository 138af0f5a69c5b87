//! In-memory secret storage with single-read semantics.
//!
//! Payloads are opaque bytes. They are zeroized when their entry is dropped,
//! which covers consumption, expiry and shutdown alike.

use dashmap::{mapref::entry::Entry as MapEntry, DashMap};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use super::keygen::{new_key, redact, SecretKey};
use super::StoreError;

/// How many fresh keys `store` draws before giving up on a collision.
pub const MAX_KEY_ATTEMPTS: usize = 4;

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// One stored secret.
struct Entry {
    payload: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.payload.zeroize();
    }
}

/// Snapshot of the store's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Entries still redeemable
    pub live_entries: usize,
    /// Entries past their expiry that nobody has touched yet
    pub expired_entries: usize,
}

/// Key -> secret mapping.
///
/// Every operation on a single key is one atomic map operation, so a key is
/// redeemed by at most one caller no matter how `take` calls interleave.
pub struct SecretStore {
    entries: DashMap<String, Entry>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store `payload` for `ttl` and return the key that redeems it.
    pub fn store(
        &self,
        payload: impl Into<Vec<u8>>,
        ttl: Duration,
    ) -> Result<SecretKey, StoreError> {
        self.store_at(payload.into(), ttl, Instant::now())
    }

    fn store_at(
        &self,
        payload: Vec<u8>,
        ttl: Duration,
        now: Instant,
    ) -> Result<SecretKey, StoreError> {
        let entry = Entry {
            payload,
            expires_at: now
                .checked_add(ttl)
                .unwrap_or_else(|| now + FAR_FUTURE),
        };

        for attempt in 1..=MAX_KEY_ATTEMPTS {
            // Drawn outside any shard lock.
            let key = new_key()?;
            match self.entries.entry(key.as_str().to_owned()) {
                MapEntry::Vacant(slot) => {
                    slot.insert(entry);
                    debug!(key = %key.redacted(), ttl_secs = ttl.as_secs(), "Secret stored");
                    return Ok(key);
                }
                MapEntry::Occupied(_) => {
                    warn!(attempt, "Generated key already in use, drawing another");
                }
            }
        }

        Err(StoreError::KeyCollision(MAX_KEY_ATTEMPTS))
    }

    /// Redeem `key`, removing its secret.
    ///
    /// Returns `None` if the key is unknown, already redeemed, or expired.
    /// The three cases are deliberately indistinguishable.
    pub fn take(&self, key: &str) -> Option<Vec<u8>> {
        self.take_at(key, Instant::now())
    }

    fn take_at(&self, key: &str, now: Instant) -> Option<Vec<u8>> {
        let Some((_, mut entry)) = self.entries.remove(key) else {
            trace!("Secret lookup miss");
            return None;
        };

        if entry.is_expired(now) {
            debug!(key = %redact(key), "Secret expired before redemption");
            return None;
        }

        debug!(key = %redact(key), "Secret redeemed");
        Some(std::mem::take(&mut entry.payload))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let expired = entry.is_expired(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        removed
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let now = Instant::now();
        let expired_entries = self
            .entries
            .iter()
            .filter(|r| r.value().is_expired(now))
            .count();
        StoreStats {
            live_entries: self.entries.len().saturating_sub(expired_entries),
            expired_entries,
        }
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Shared secret store handle for use across the application.
pub type SharedSecretStore = Arc<SecretStore>;

/// Create a new shared secret store.
pub fn create_secret_store() -> SharedSecretStore {
    Arc::new(SecretStore::new())
}
