//! Key-value backend contract and implementations.
//!
//! The [`Backend`] trait is everything the [`Store`](crate::Store) needs from
//! an ordered key-value store:
//!
//! - point `get` / `put` / `delete`
//! - ordered `scan` over a key prefix (the empty prefix scans everything)
//! - optional bulk `clear`
//!
//! Implementations:
//!
//! - [`EngineBackend`]: durable, on-disk (WAL + SSTables)
//! - [`MemoryBackend`]: in-memory, for tests and ephemeral data
//!
//! Backends report absence as `Ok(None)` and every other failure as a
//! [`BackendError`](crate::error::BackendError); the store translates those
//! into its own error taxonomy.

mod engine;
mod memory;

use async_trait::async_trait;

use crate::error::{BackendError, BackendResult};

pub use engine::EngineBackend;
pub use memory::MemoryBackend;

/// Ordered key-value store contract
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the value stored at `key`, or `None` if there is none
    async fn get(&self, key: &[u8]) -> BackendResult<Option<Vec<u8>>>;

    /// Store `value` at `key`, replacing any previous value
    async fn put(&self, key: &[u8], value: &[u8]) -> BackendResult<()>;

    /// Remove `key`; removing an absent key succeeds
    async fn delete(&self, key: &[u8]) -> BackendResult<()>;

    /// All entries whose key starts with `prefix`, ascending by key
    ///
    /// Every call is an independent scan of current state.
    async fn scan(&self, prefix: &[u8]) -> BackendResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Remove every key
    async fn clear(&self) -> BackendResult<()> {
        Err(BackendError::Unsupported("clear".to_string()))
    }

    /// Release the handle; called once at shutdown
    async fn close(&self) -> BackendResult<()> {
        Ok(())
    }
}
