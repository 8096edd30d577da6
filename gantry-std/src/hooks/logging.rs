//! Logging hook for request observation.

use gantry_core::{ActionHook, BoxError, HttpContext};

/// A hook that logs requests entering and leaving an action.
///
/// Never alters the context. Emits `tracing` events when the `tracing`
/// feature is enabled and does nothing otherwise.
pub struct LoggingHook {
    name: &'static str,
}

impl LoggingHook {
    /// Create a new `LoggingHook` with a default name.
    pub fn new() -> Self {
        Self { name: "request" }
    }

    /// Create a new `LoggingHook` with a custom name.
    ///
    /// The name is used in log messages to identify the stage.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionHook for LoggingHook {
    type Payload = ();

    fn name(&self) -> &str {
        self.name
    }

    async fn on_pre_action(&self, ctx: &mut HttpContext, _: &()) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                name = %self.name,
                method = ctx.request.method(),
                url = ctx.request.url(),
                "entering action"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = ctx;
        }

        Ok(())
    }

    async fn on_post_action(&self, ctx: &mut HttpContext, _: &()) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                name = %self.name,
                url = ctx.request.url(),
                status = ctx.response.status,
                immediately = ctx.response.is_immediately(),
                has_result = ctx.response.result().is_some(),
                "leaving action"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = ctx;
        }

        Ok(())
    }
}
