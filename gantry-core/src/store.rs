//! Storage contract for cached responses.

use crate::error::BoxError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::SystemTime;

/// A cached response.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Absolute expiry time.
    pub expires: SystemTime,
    /// The captured response result.
    pub result: Value,
}

impl CacheEntry {
    /// Whether the entry is still valid at `now`. Expiry is exclusive.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        self.expires > now
    }
}

/// Key/value storage for [`CacheEntry`] values.
///
/// Must tolerate concurrent calls from in-flight requests. No atomicity is
/// expected across a `get` followed by `create` or `delete`; a store that
/// wants stronger guarantees provides them itself.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch an entry.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, BoxError>;

    /// Insert or replace an entry.
    async fn create(&self, key: &str, entry: CacheEntry) -> Result<(), BoxError>;

    /// Remove an entry. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_freshness_is_exclusive() {
        let now = SystemTime::now();
        let entry = CacheEntry {
            expires: now,
            result: Value::Null,
        };
        assert!(!entry.is_fresh(now));
        assert!(entry.is_fresh(now - Duration::from_millis(1)));
    }
}
