#[cfg(feature = "couch-store")]
pub mod couchdb;
mod file;
mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

pub use self::{file::FileStore, memory::MemoryStore};

/// Byte-oriented key-value store holding one JSON blob per key.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw bytes stored under `key`, if any.
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>>;
    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Short backend name used in logs and health reports.
    fn backend(&self) -> &'static str;
}
