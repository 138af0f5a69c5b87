//! The one-time secret store.
//!
//! Secrets live only in process memory. Each secret is reachable through a
//! random key, is handed out at most once, and disappears after its TTL
//! whether or not anyone read it.
//!
//! ## Usage
//!
//! ```ignore
//! let store = store::create_secret_store();
//! let key = store.store(b"hunter2".to_vec(), Duration::from_secs(3600))?;
//!
//! assert_eq!(store.take(key.as_str()), Some(b"hunter2".to_vec()));
//! assert_eq!(store.take(key.as_str()), None);
//! ```

pub mod keygen;
pub mod secrets;
pub mod sweeper;

pub use keygen::{new_key, SecretKey, KEY_BYTES};
pub use secrets::{create_secret_store, SecretStore, SharedSecretStore, StoreStats};
pub use sweeper::spawn_sweeper;

use thiserror::Error;

/// Store errors. Both are fatal for the `store` call that hit them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Secure random source failed: {0}")]
    Generator(#[from] rand::Error),

    #[error("Could not find a free key after {0} attempts")]
    KeyCollision(usize),
}
