//! Error types for Gantry.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GantryError`] - Top-level error type for all Gantry operations
//! - [`ResolveError`] - Errors while building a handler's argument list
//! - [`HookError`] - Errors raised by lifecycle hooks
//! - [`RegistryError`] - Errors while assembling the metadata registry
//! - [`DispatchError`] - Errors surfaced by a single request dispatch
//!
//! User-supplied code (transforms, hooks, cache stores, handlers) reports
//! failures as [`BoxError`]; the framework wraps them without altering the
//! source so callers can still downcast.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Gantry operations.
#[derive(Error, Debug)]
pub enum GantryError {
    /// An error occurred while resolving handler arguments.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// An error occurred in a lifecycle hook.
    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    /// An error occurred while assembling the registry.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An error occurred during dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that can occur while resolving handler arguments.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The transport failed to deliver the request body.
    #[error("failed to read request body")]
    BodyRead(#[source] BoxError),

    /// The request body did not match the requested format.
    #[error("failed to parse request body as {kind}")]
    BodyParse {
        /// The body format that was requested.
        kind: &'static str,
        /// The underlying parser error.
        #[source]
        source: BoxError,
    },

    /// The request body exceeded the configured limit.
    #[error("request body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge {
        /// Actual body size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A body transform failed. The transform's error is passed through.
    #[error(transparent)]
    Transform(BoxError),
}

/// The lifecycle phase a hook was running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before the handler.
    Pre,
    /// After the handler.
    Post,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookPhase::Pre => f.write_str("pre"),
            HookPhase::Post => f.write_str("post"),
        }
    }
}

/// Errors that can occur in hooks.
#[derive(Error, Debug)]
#[error("hook `{hook}` failed in {phase} phase")]
pub struct HookError {
    /// Name of the failing hook.
    pub hook: String,
    /// Phase the hook was running in.
    pub phase: HookPhase,
    /// The error returned by the hook.
    #[source]
    pub source: BoxError,
}

impl HookError {
    /// Create a new hook error.
    pub fn new(hook: impl Into<String>, phase: HookPhase, source: BoxError) -> Self {
        Self {
            hook: hook.into(),
            phase,
            source,
        }
    }
}

/// Errors that can occur while assembling the metadata registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Two parameters of one action share an argument index.
    #[error("duplicate parameter index {index} on {controller}::{action}")]
    DuplicateParamIndex {
        /// Controller name.
        controller: String,
        /// Action name.
        action: String,
        /// The duplicated index.
        index: usize,
    },

    /// The same action was registered twice.
    #[error("route already registered for {controller}::{action}")]
    DuplicateRoute {
        /// Controller name.
        controller: String,
        /// Action name.
        action: String,
    },

    /// A parameter was declared for an action that has no route.
    #[error("parameters declared for unknown route {controller}::{action}")]
    UnknownRoute {
        /// Controller name.
        controller: String,
        /// Action name.
        action: String,
    },
}

/// Errors that can occur during a single dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Argument resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The handler failed.
    #[error("handler `{action}` failed")]
    Handler {
        /// Action name.
        action: String,
        /// The error returned by the handler.
        #[source]
        source: BoxError,
    },
}

// Convenience conversions
impl From<BoxError> for GantryError {
    fn from(err: BoxError) -> Self {
        GantryError::Custom(err)
    }
}
