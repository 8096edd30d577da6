//! # Request Dispatch
//!
//! Runs one request through the fixed lifecycle:
//!
//! 1. pre-action hooks
//! 2. short-circuit check (once, after every pre-hook has run)
//! 3. argument resolution and the handler, unless short-circuited
//! 4. post-action hooks
//!
//! Any failure aborts the remaining steps and is returned to the caller,
//! which is expected to map it to a server-error response.

use crate::pipeline::HookPipeline;
use crate::registry::MetadataRegistry;
use crate::resolve::{resolve, resolve_for_message};
use futures::future::{BoxFuture, FutureExt};
use gantry_core::{
    Argument, BoxError, DispatchError, HttpContext, MessageContext, RouteMetadata,
    TransformConfig,
};
use serde_json::Value;
use std::sync::Arc;

/// A handler invoked with resolved positional arguments.
pub trait ActionHandler: Send + Sync {
    /// Invoke the handler.
    fn call<'a>(&'a self, args: Vec<Argument<'a>>) -> BoxFuture<'a, Result<Value, BoxError>>;
}

/// Synchronous handler built from a closure. See [`handler_fn`].
pub struct FnHandler<F> {
    func: F,
}

/// Wrap a synchronous closure as an [`ActionHandler`].
///
/// ```rust,ignore
/// let handler = handler_fn(|args| Ok(json!({ "id": args[0].as_str() })));
/// ```
pub fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: for<'a> Fn(Vec<Argument<'a>>) -> Result<Value, BoxError> + Send + Sync,
{
    FnHandler { func }
}

impl<F> ActionHandler for FnHandler<F>
where
    F: for<'a> Fn(Vec<Argument<'a>>) -> Result<Value, BoxError> + Send + Sync,
{
    fn call<'a>(&'a self, args: Vec<Argument<'a>>) -> BoxFuture<'a, Result<Value, BoxError>> {
        futures::future::ready((self.func)(args)).boxed()
    }
}

/// Drives requests through hooks, resolution and handlers.
pub struct Dispatcher {
    registry: Arc<MetadataRegistry>,
    transforms: Option<TransformConfig>,
}

impl Dispatcher {
    /// Create a dispatcher over an assembled registry.
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self {
            registry,
            transforms: None,
        }
    }

    /// Use a global body transform configuration.
    pub fn with_transforms(mut self, transforms: TransformConfig) -> Self {
        self.transforms = Some(transforms);
        self
    }

    /// The registry this dispatcher reads.
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// Dispatch an HTTP request.
    ///
    /// On success the handler's value (or the short-circuit value) is in
    /// `ctx.response`.
    pub async fn dispatch<H>(
        &self,
        ctx: &mut HttpContext,
        route: &RouteMetadata,
        handler: &H,
    ) -> Result<(), DispatchError>
    where
        H: ActionHandler + ?Sized,
    {
        let pipeline: HookPipeline<'_> = self
            .registry
            .pipeline_for(route.controller(), route.action());

        pipeline.run_pre(ctx).await?;

        if ctx.response.is_immediately() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                controller = route.controller(),
                action = route.action(),
                "responding immediately, handler skipped"
            );
        } else {
            let value = {
                let args = resolve(ctx, route, self.transforms.as_ref()).await?;
                handler
                    .call(args)
                    .await
                    .map_err(|source| DispatchError::Handler {
                        action: route.action().to_owned(),
                        source,
                    })?
            };
            ctx.response.set_result(value);
        }

        pipeline.run_post(ctx).await?;
        Ok(())
    }

    /// Dispatch a message invocation. Hooks do not apply to messages.
    pub async fn dispatch_message<H>(
        &self,
        ctx: &MessageContext,
        route: &RouteMetadata,
        body: &Value,
        handler: &H,
    ) -> Result<Value, DispatchError>
    where
        H: ActionHandler + ?Sized,
    {
        let args = resolve_for_message(ctx, route, body);
        handler
            .call(args)
            .await
            .map_err(|source| DispatchError::Handler {
                action: route.action().to_owned(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingBody, FailingHook, RecordingHook};
    use gantry_core::{BoundHook, ParameterDescriptor, Request, RouteDefinition};
    use serde_json::json;
    use std::sync::Mutex;

    fn echo_handler() -> impl ActionHandler {
        handler_fn(|args| {
            Ok(json!({ "id": args.first().and_then(Argument::as_str) }))
        })
    }

    #[tokio::test]
    async fn test_dispatch_sets_handler_result() {
        let registry = MetadataRegistry::builder()
            .route(
                RouteDefinition::new("Users", "get", "GET", "/users")
                    .param(ParameterDescriptor::query(0, "id")),
            )
            .build()
            .unwrap();
        let registry = Arc::new(registry);
        let route = RouteMetadata::without_params(Arc::clone(
            registry.route("Users", "get").unwrap(),
        ));
        let dispatcher = Dispatcher::new(registry);
        let mut ctx = HttpContext::new(Request::new("GET", "http://h/users?id=9"));

        dispatcher
            .dispatch(&mut ctx, &route, &echo_handler())
            .await
            .unwrap();

        assert_eq!(ctx.response.result(), Some(&json!({ "id": "9" })));
    }

    #[tokio::test]
    async fn test_short_circuit_skips_resolution_and_handler() {
        let recorder = Arc::new(RecordingHook::new());
        recorder.short_circuit_on("cache", json!("cached"));
        let registry = MetadataRegistry::builder()
            .route(
                RouteDefinition::new("Users", "create", "POST", "/users")
                    .param(ParameterDescriptor::body(0)),
            )
            .hook(BoundHook::new(Arc::clone(&recorder), "cache".into()).on_controller("Users"))
            .hook(
                BoundHook::new(Arc::clone(&recorder), "audit".into())
                    .on_action("Users", "create"),
            )
            .build()
            .unwrap();
        let registry = Arc::new(registry);
        let route = RouteMetadata::without_params(Arc::clone(
            registry.route("Users", "create").unwrap(),
        ));
        let body = CountingBody::new("{}");
        let mut ctx = HttpContext::new(
            Request::new("POST", "http://h/users").with_body(body.clone()),
        );
        let invoked = Mutex::new(false);
        let handler = handler_fn(|_| {
            *invoked.lock().unwrap() = true;
            Ok(json!("fresh"))
        });

        Dispatcher::new(registry)
            .dispatch(&mut ctx, &route, &handler)
            .await
            .unwrap();

        assert!(!*invoked.lock().unwrap());
        assert_eq!(body.reads(), 0);
        assert_eq!(ctx.response.result(), Some(&json!("cached")));
        assert_eq!(
            recorder.calls(),
            vec!["pre:cache", "pre:audit", "post:cache", "post:audit"]
        );
    }

    #[tokio::test]
    async fn test_post_hook_failure_propagates() {
        let registry = MetadataRegistry::builder()
            .route(RouteDefinition::new("Users", "list", "GET", "/users"))
            .hook(BoundHook::new(Arc::new(FailingHook::post()), ()).on_controller("Users"))
            .build()
            .unwrap();
        let registry = Arc::new(registry);
        let route = RouteMetadata::without_params(Arc::clone(
            registry.route("Users", "list").unwrap(),
        ));
        let mut ctx = HttpContext::new(Request::new("GET", "http://h/users"));

        let err = Dispatcher::new(registry)
            .dispatch(&mut ctx, &route, &echo_handler())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Hook(ref e) if e.phase == gantry_core::HookPhase::Post));
        // the handler already ran; nothing is rolled back
        assert_eq!(ctx.response.result(), Some(&json!({ "id": null })));
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let registry = Arc::new(
            MetadataRegistry::builder()
                .route(RouteDefinition::new("Users", "list", "GET", "/users"))
                .build()
                .unwrap(),
        );
        let route = RouteMetadata::without_params(Arc::clone(
            registry.route("Users", "list").unwrap(),
        ));
        let mut ctx = HttpContext::new(Request::new("GET", "http://h/users"));
        let handler = handler_fn(|_| Err("boom".into()));

        let err = Dispatcher::new(registry)
            .dispatch(&mut ctx, &route, &handler)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Handler { ref action, .. } if action == "list"));
        assert!(ctx.response.result().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_message() {
        let registry = Arc::new(
            MetadataRegistry::builder()
                .route(
                    RouteDefinition::new("Users", "created", "users.created", "users.created")
                        .param(ParameterDescriptor::body(0)),
                )
                .build()
                .unwrap(),
        );
        let route = RouteMetadata::without_params(Arc::clone(
            registry.route("Users", "created").unwrap(),
        ));
        let ctx = MessageContext::new("users.created", Value::Null);
        let handler = handler_fn(|args| Ok(args[0].as_value().cloned().unwrap_or_default()));

        let value = Dispatcher::new(registry)
            .dispatch_message(&ctx, &route, &json!({ "id": 1 }), &handler)
            .await
            .unwrap();

        assert_eq!(value, json!({ "id": 1 }));
    }
}
