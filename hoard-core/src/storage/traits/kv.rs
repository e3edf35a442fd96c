//! KeyValueStore trait for the persistence primitive under the asset store

use anyhow::Result;
use async_trait::async_trait;

/// String-keyed get/set storage
///
/// Values are opaque strings. Both operations may fail for backend-specific
/// reasons (I/O, quota, corruption); callers decide how to surface that.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Returns Ok(None) if nothing was ever written under that key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key` in a single write
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
