//! Durable key-value storage for client state.
//!
//! # Architecture
//!
//! State containers (the cart, the session) receive a [`KeyValueStore`] at
//! construction and use it with a strict discipline: load once on init, save
//! after every mutation. Values are opaque strings; each container owns its
//! own serialization.
//!
//! Two implementations ship with the crate:
//! - [`FileStore`] - one file per key in a state directory, atomically replaced
//! - [`MemoryStore`] - a `HashMap`, for tests and ephemeral runs

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// Key holding the serialized cart.
    pub const CART: &str = "cart-storage";

    /// Key holding the serialized session (role, profile, token).
    pub const SESSION: &str = "auth-storage";
}

/// Errors that can occur reading or writing stored state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key contains characters the backend cannot represent.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be decoded.
    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend refused the write (used by test doubles).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage keyed by name.
///
/// Implementations must make a successful [`set`](Self::set) visible to every
/// later [`get`](Self::get), including one made by a new process.
pub trait KeyValueStore {
    /// Read the value under `key`. A missing key is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Durably store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
