//! Standard hook implementations.

mod logging;
mod response_cache;

pub use logging::LoggingHook;
pub use response_cache::{
    CacheKeyFn, Clock, ResponseCacheHook, ResponseCachePayload, response_cache,
};
