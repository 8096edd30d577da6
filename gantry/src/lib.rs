//! # gantry - Request Handling Core
//!
//! `gantry` resolves the positional arguments of request handlers from a
//! declarative description of their parameters, and runs before/after
//! lifecycle hooks around them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gantry::prelude::*;
//!
//! // Assemble once at startup
//! let cache = Arc::new(ResponseCacheHook::new(Arc::new(MemoryCacheStore::new())));
//! let registry = MetadataRegistry::builder()
//!     .route(
//!         RouteDefinition::new("Users", "get", "GET", "/users/:id")
//!             .param(ParameterDescriptor::route_param(0, "id"))
//!             .param(ParameterDescriptor::query(1, "fields")),
//!     )
//!     .hook(response_cache(cache, ResponseCachePayload::new(Duration::from_secs(30)))
//!         .on_action("Users", "get"))
//!     .build()?;
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//! // Per request, after the router matched `route`
//! dispatcher.dispatch(&mut ctx, &route, &handler).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use gantry_core::{
    // Hooks
    ActionHook,
    // Arguments
    Argument,
    // Context
    BodyKind,
    BodyParseOptions,
    BodySource,
    BoundHook,
    // Errors
    BoxError,
    // Cache
    CacheEntry,
    CacheStore,
    ContextRef,
    DispatchError,
    DynActionHook,
    GantryError,
    HookError,
    HookPhase,
    HookRegistration,
    HookScope,
    HttpContext,
    MessageContext,
    ParamKind,
    ParameterDescriptor,
    QueryMap,
    RegistryError,
    Request,
    ResolveError,
    Response,
    // Routes
    RouteDefinition,
    RouteMetadata,
    Transform,
    TransformConfig,
    TransformSet,
};

pub use gantry_std::{
    ActionHandler, Dispatcher, FnHandler, HookPipeline, MemoryCacheStore, MetadataRegistry,
    RegistryBuilder, handler_fn, parse_cookies, query_params, resolve, resolve_for_message,
};

/// Standard hook implementations.
pub mod hooks {
    pub use gantry_std::hooks::{
        CacheKeyFn, Clock, LoggingHook, ResponseCacheHook, ResponseCachePayload, response_cache,
    };
}

/// Testing utilities.
pub mod testing {
    pub use gantry_std::testing::{
        CountingBody, FailingHook, FailingStore, InjectedFailure, ManualClock, RecordingHook,
    };
}

/// Prelude module - common imports for Gantry.
///
/// # Usage
///
/// ```rust,ignore
/// use gantry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::hooks::{ResponseCacheHook, ResponseCachePayload, response_cache};
    pub use crate::{
        ActionHandler, ActionHook, Argument, BoxError, Dispatcher, HttpContext,
        MemoryCacheStore, MetadataRegistry, ParameterDescriptor, Request, RouteDefinition,
        RouteMetadata, handler_fn,
    };
}
