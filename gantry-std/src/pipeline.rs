//! Sequential execution of lifecycle hooks.

use gantry_core::{HookError, HookPhase, HookRegistration, HttpContext};

/// The hooks applying to one action, in registration order.
///
/// Both phases run every hook sequentially. A hook that short-circuits the
/// response does not stop the hooks after it; the dispatcher checks
/// [`Response::is_immediately`] once the pre-phase has completed. The first
/// failing hook aborts its phase and its error is returned as is, without
/// undoing the effects of the hooks that already ran.
///
/// [`Response::is_immediately`]: gantry_core::Response::is_immediately
#[derive(Debug, Clone, Default)]
pub struct HookPipeline<'r> {
    hooks: Vec<&'r HookRegistration>,
}

impl<'r> HookPipeline<'r> {
    /// Create a pipeline over already-selected registrations.
    pub fn new(hooks: Vec<&'r HookRegistration>) -> Self {
        Self { hooks }
    }

    /// Number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the pipeline has no hooks.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every pre-action hook.
    pub async fn run_pre(&self, ctx: &mut HttpContext) -> Result<(), HookError> {
        for registration in &self.hooks {
            let hook = &registration.hook;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                hook = hook.name(),
                controller = %registration.target,
                "pre-action hook"
            );

            if let Err(source) = hook.on_pre_dyn(ctx).await {
                #[cfg(feature = "tracing")]
                tracing::warn!(hook = hook.name(), error = %source, "pre-action hook failed");
                return Err(HookError::new(hook.name(), HookPhase::Pre, source));
            }
        }
        Ok(())
    }

    /// Run every post-action hook.
    pub async fn run_post(&self, ctx: &mut HttpContext) -> Result<(), HookError> {
        for registration in &self.hooks {
            let hook = &registration.hook;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                hook = hook.name(),
                controller = %registration.target,
                "post-action hook"
            );

            if let Err(source) = hook.on_post_dyn(ctx).await {
                #[cfg(feature = "tracing")]
                tracing::warn!(hook = hook.name(), error = %source, "post-action hook failed");
                return Err(HookError::new(hook.name(), HookPhase::Post, source));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingHook, RecordingHook};
    use gantry_core::{BoundHook, Request};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hooks_run_in_registration_order() {
        let recorder = Arc::new(RecordingHook::new());
        let first = BoundHook::new(Arc::clone(&recorder), "first".into()).on_controller("C");
        let second = BoundHook::new(Arc::clone(&recorder), "second".into()).on_action("C", "a");
        let pipeline = HookPipeline::new(vec![&first, &second]);
        let mut ctx = HttpContext::new(Request::new("GET", "/"));

        pipeline.run_pre(&mut ctx).await.unwrap();
        pipeline.run_post(&mut ctx).await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec!["pre:first", "pre:second", "post:first", "post:second"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_does_not_stop_later_pre_hooks() {
        let recorder = Arc::new(RecordingHook::new());
        let stopper = BoundHook::new(Arc::clone(&recorder), "stop".into()).on_controller("C");
        let observer = BoundHook::new(Arc::clone(&recorder), "observe".into()).on_controller("C");
        let pipeline = HookPipeline::new(vec![&stopper, &observer]);
        let mut ctx = HttpContext::new(Request::new("GET", "/"));
        recorder.short_circuit_on("stop", json!("early"));

        pipeline.run_pre(&mut ctx).await.unwrap();

        assert!(ctx.response.is_immediately());
        assert_eq!(recorder.calls(), vec!["pre:stop", "pre:observe"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_phase() {
        let recorder = Arc::new(RecordingHook::new());
        let failing = BoundHook::new(Arc::new(FailingHook::pre()), ()).on_controller("C");
        let after = BoundHook::new(Arc::clone(&recorder), "after".into()).on_controller("C");
        let pipeline = HookPipeline::new(vec![&failing, &after]);
        let mut ctx = HttpContext::new(Request::new("GET", "/"));

        let err = pipeline.run_pre(&mut ctx).await.unwrap_err();

        assert_eq!(err.phase, HookPhase::Pre);
        assert_eq!(err.hook, "failing");
        assert!(recorder.calls().is_empty());
    }
}
