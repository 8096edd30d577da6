#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use gantry::{
    ActionHandler, Argument, BoxError, HttpContext, ParameterDescriptor, Request,
    RouteDefinition, RouteMetadata,
};
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Routes
// ============================================================================

/// `/home/test/testQuery` with query params `a`, `b`, `c` and one query object.
pub fn query_route() -> RouteMetadata {
    let def = RouteDefinition::new("Home", "testQuery", "GET", "/home/test/testQuery")
        .param(ParameterDescriptor::query(0, "a"))
        .param(ParameterDescriptor::query(1, "b"))
        .param(ParameterDescriptor::query(2, "c"))
        .param(ParameterDescriptor::query_object(3));
    RouteMetadata::without_params(Arc::new(def))
}

pub fn get(url: &str) -> HttpContext {
    HttpContext::new(Request::new("GET", url))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler that counts invocations and returns `{"call": n}`.
#[derive(Clone, Default)]
pub struct CountingHandler {
    pub calls: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ActionHandler for CountingHandler {
    fn call<'a>(&'a self, _args: Vec<Argument<'a>>) -> BoxFuture<'a, Result<Value, BoxError>> {
        async move {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "call": n }))
        }
        .boxed()
    }
}
