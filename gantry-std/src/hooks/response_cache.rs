//! Response cache hook.
//!
//! Serves a stored result for repeated requests until it expires.
//!
//! - **pre-action**: look the request's key up in the [`CacheStore`]. A fresh
//!   entry becomes the response result and the request responds immediately.
//!   An expired entry is deleted and the request proceeds.
//! - **post-action**: store the current result under the key with
//!   `expires = now + duration`. This also runs after a cache hit, which
//!   re-caches the served value.
//!
//! There is no locking between requests: concurrent misses for one key may
//! all reach the handler, and the last write wins.

use gantry_core::{ActionHook, BoundHook, BoxError, CacheEntry, CacheStore, HttpContext};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Computes a cache key from a request.
pub type CacheKeyFn = dyn Fn(&HttpContext) -> String + Send + Sync;

/// Source of the current time.
pub type Clock = dyn Fn() -> SystemTime + Send + Sync;

/// Per-registration cache configuration.
#[derive(Clone)]
pub struct ResponseCachePayload {
    /// How long a stored result stays fresh.
    pub duration: Duration,
    key: Option<Arc<CacheKeyFn>>,
}

impl ResponseCachePayload {
    /// Cache for `duration`, keyed by the full request URL.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            key: None,
        }
    }

    /// Use a custom key function instead of the request URL.
    pub fn with_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&HttpContext) -> String + Send + Sync + 'static,
    {
        self.key = Some(Arc::new(key));
        self
    }

    /// The cache key for a request.
    ///
    /// Defaults to the raw URL, query string included, so differently
    /// ordered queries get different keys.
    pub fn key_for(&self, ctx: &HttpContext) -> String {
        match &self.key {
            Some(key) => key(ctx),
            None => ctx.request.url().to_owned(),
        }
    }
}

impl std::fmt::Debug for ResponseCachePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCachePayload")
            .field("duration", &self.duration)
            .field("custom_key", &self.key.is_some())
            .finish()
    }
}

/// Hook that caches response results in a [`CacheStore`].
pub struct ResponseCacheHook {
    store: Arc<dyn CacheStore>,
    clock: Arc<Clock>,
}

impl ResponseCacheHook {
    /// Create a cache hook over a store, using the system clock.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemTime::now),
        }
    }

    /// Replace the clock.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> SystemTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    fn now(&self) -> SystemTime {
        (self.clock)()
    }
}

impl ActionHook for ResponseCacheHook {
    type Payload = ResponseCachePayload;

    fn name(&self) -> &str {
        "response_cache"
    }

    async fn on_pre_action(
        &self,
        ctx: &mut HttpContext,
        payload: &ResponseCachePayload,
    ) -> Result<(), BoxError> {
        let key = payload.key_for(ctx);

        match self.store.get(&key).await? {
            Some(entry) if entry.is_fresh(self.now()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%key, "response cache hit");
                ctx.response.set_result(entry.result);
                ctx.response.set_immediately();
            }
            Some(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%key, "response cache entry expired");
                self.store.delete(&key).await?;
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%key, "response cache miss");
            }
        }
        Ok(())
    }

    async fn on_post_action(
        &self,
        ctx: &mut HttpContext,
        payload: &ResponseCachePayload,
    ) -> Result<(), BoxError> {
        let key = payload.key_for(ctx);
        let entry = CacheEntry {
            expires: self.now() + payload.duration,
            result: ctx.response.result().cloned().unwrap_or(Value::Null),
        };
        self.store.create(&key, entry).await
    }
}

/// Bind the cache hook to a payload, ready to attach to a controller or
/// action.
///
/// ```rust,ignore
/// let registry = MetadataRegistry::builder()
///     .hook(response_cache(Arc::clone(&cache), ResponseCachePayload::new(Duration::from_secs(30)))
///         .on_action("Users", "list"))
///     .build()?;
/// ```
pub fn response_cache(
    hook: Arc<ResponseCacheHook>,
    payload: ResponseCachePayload,
) -> BoundHook<ResponseCacheHook> {
    BoundHook::new(hook, payload)
}
