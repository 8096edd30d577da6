//! In-process cache store.

use async_trait::async_trait;
use dashmap::DashMap;
use gantry_core::{BoxError, CacheEntry, CacheStore};
use std::time::SystemTime;

/// A [`CacheStore`] kept in memory.
///
/// Backed by a sharded concurrent map, so concurrent requests never block
/// each other for long. Entries are only removed when the cache hook finds
/// them expired, or by [`MemoryCacheStore::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry that is no longer fresh at `now`. Returns how many
    /// were removed.
    pub fn purge_expired(&self, now: SystemTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, BoxError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn create(&self, key: &str, entry: CacheEntry) -> Result<(), BoxError> {
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        self.entries.remove(key);
        Ok(())
    }
}
