//! # gantry-core
//!
//! Core contracts for the Gantry request-handling framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! hooks, cache stores and transports that don't need the full `gantry-std`
//! implementation.
//!
//! # Request Lifecycle
//!
//! Every request passes through the same four steps, in this order:
//!
//! 1. **Pre-hooks** ([`ActionHook::on_pre_action`]) observe the
//!    [`HttpContext`] and may short-circuit by marking the [`Response`]
//!    immediate.
//! 2. **Argument resolution** turns the route's [`ParameterDescriptor`]s into
//!    positional [`Argument`]s. Reading the body is the only suspension point.
//! 3. **The handler** runs with those arguments, unless short-circuited.
//! 4. **Post-hooks** ([`ActionHook::on_post_action`]) observe or replace the
//!    produced result.
//!
//! # Error Types
//!
//! - [`GantryError`] - Top-level error type
//! - [`ResolveError`] - Argument resolution errors
//! - [`HookError`] - Hook execution errors
//! - [`RegistryError`] - Assembly-time errors
//! - [`DispatchError`] - Per-request dispatch errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod hook;
mod param;
mod route;
mod store;

// Re-exports
pub use context::{
    BodyKind, BodyParseOptions, BodySource, HttpContext, MessageContext, Request, Response,
};
pub use error::{
    BoxError, DispatchError, GantryError, HookError, HookPhase, RegistryError, ResolveError,
};
pub use hook::{ActionHook, BoundHook, DynActionHook, HookFuture, HookRegistration, HookScope};
pub use param::{
    Argument, ContextRef, ParamKind, ParameterDescriptor, QueryMap, Transform, TransformConfig,
    TransformFn, TransformSet,
};
pub use route::{RouteDefinition, RouteMetadata};
pub use store::{CacheEntry, CacheStore};
