//! # Lifecycle Hooks
//!
//! Cross-cutting logic that runs before and after a handler.
//!
//! A hook sees the live [`HttpContext`] and its own registration payload.
//! It short-circuits a request only through the context: by filling the
//! response result and raising [`Response::set_immediately`]. The pipeline
//! has no special knowledge of any hook.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`ActionHook`] uses native `async fn` with a typed payload. The registry
//! stores hooks as [`DynActionHook`] trait objects; [`BoundHook`] pairs a hook
//! with its payload and performs the erasure.
//!
//! [`Response::set_immediately`]: crate::Response::set_immediately

use crate::context::HttpContext;
use crate::error::BoxError;
use std::{future::Future, pin::Pin, sync::Arc};

/// Boxed future returned by [`DynActionHook`].
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

/// A before/after interceptor for actions.
///
/// # Example
///
/// ```rust
/// use gantry_core::{ActionHook, BoxError, HttpContext};
///
/// struct Stamp;
///
/// impl ActionHook for Stamp {
///     type Payload = String;
///
///     async fn on_pre_action(&self, ctx: &mut HttpContext, tag: &String) -> Result<(), BoxError> {
///         ctx.response.headers.insert("x-stamp".into(), tag.clone());
///         Ok(())
///     }
///
///     async fn on_post_action(&self, _ctx: &mut HttpContext, _tag: &String) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ActionHook`",
    label = "missing `ActionHook` implementation",
    note = "Hooks must implement `on_pre_action` and `on_post_action`."
)]
pub trait ActionHook: Send + Sync + 'static {
    /// Per-registration configuration.
    type Payload: Send + Sync + 'static;

    /// Name used in errors and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs before argument resolution and the handler.
    fn on_pre_action(
        &self,
        ctx: &mut HttpContext,
        payload: &Self::Payload,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Runs after the handler, or after a short-circuit.
    fn on_post_action(
        &self,
        ctx: &mut HttpContext,
        payload: &Self::Payload,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`ActionHook`], with the payload bound in.
pub trait DynActionHook: Send + Sync + 'static {
    /// Name used in errors and logs.
    fn name(&self) -> &str;

    /// Pre-phase (dynamic dispatch version).
    fn on_pre_dyn<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a>;

    /// Post-phase (dynamic dispatch version).
    fn on_post_dyn<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a>;
}

/// A hook instance paired with the payload of one registration.
pub struct BoundHook<H: ActionHook> {
    hook: Arc<H>,
    payload: H::Payload,
}

impl<H: ActionHook> BoundHook<H> {
    /// Bind a payload to a shared hook instance.
    pub fn new(hook: Arc<H>, payload: H::Payload) -> Self {
        Self { hook, payload }
    }

    /// The bound payload.
    pub fn payload(&self) -> &H::Payload {
        &self.payload
    }

    /// Attach to every action of a controller.
    pub fn on_controller(self, controller: impl Into<String>) -> HookRegistration {
        HookRegistration {
            scope: HookScope::Controller,
            target: controller.into(),
            method: String::new(),
            hook: Arc::new(self),
        }
    }

    /// Attach to a single action.
    pub fn on_action(
        self,
        controller: impl Into<String>,
        method: impl Into<String>,
    ) -> HookRegistration {
        HookRegistration {
            scope: HookScope::Action,
            target: controller.into(),
            method: method.into(),
            hook: Arc::new(self),
        }
    }
}

impl<H: ActionHook> DynActionHook for BoundHook<H> {
    fn name(&self) -> &str {
        self.hook.name()
    }

    fn on_pre_dyn<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a> {
        Box::pin(self.hook.on_pre_action(ctx, &self.payload))
    }

    fn on_post_dyn<'a>(&'a self, ctx: &'a mut HttpContext) -> HookFuture<'a> {
        Box::pin(self.hook.on_post_action(ctx, &self.payload))
    }
}

/// Whether a hook applies to a whole controller or a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope {
    /// Every action on the controller.
    Controller,
    /// One action.
    Action,
}

/// A hook attached to a controller or action.
///
/// Created once during application assembly and never mutated.
#[derive(Clone)]
pub struct HookRegistration {
    /// Scope of the attachment.
    pub scope: HookScope,
    /// Controller name.
    pub target: String,
    /// Action name; empty for controller scope.
    pub method: String,
    /// The hook with its payload.
    pub hook: Arc<dyn DynActionHook>,
}

impl HookRegistration {
    /// Whether this registration applies to `controller::action`.
    pub fn matches(&self, controller: &str, action: &str) -> bool {
        if self.target != controller {
            return false;
        }
        match self.scope {
            HookScope::Controller => true,
            HookScope::Action => self.method == action,
        }
    }
}

impl std::fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistration")
            .field("scope", &self.scope)
            .field("target", &self.target)
            .field("method", &self.method)
            .field("hook", &self.hook.name())
            .finish()
    }
}
