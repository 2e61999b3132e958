//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

/// Persistence contract: a flat map of string keys to serialized blobs.
///
/// The report collection lives under a single key and is always written
/// whole, so backends only need get/replace semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Replaces the value for `key`. A failed write must leave the previous
    /// value readable.
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
