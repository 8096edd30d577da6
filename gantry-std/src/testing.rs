//! Testing utilities for Gantry.
//!
//! This module provides doubles that make testing hooks, stores and handlers
//! easier.
//!
//! # Features
//!
//! - [`RecordingHook`]: A hook that records every phase it runs in
//! - [`FailingHook`]: A hook that fails in a chosen phase
//! - [`CountingBody`]: A body source that counts how often it was read
//! - [`FailingStore`]: A cache store whose every operation fails
//! - [`ManualClock`]: A clock that only moves when told to

use async_trait::async_trait;
use gantry_core::{ActionHook, BodySource, BoxError, CacheEntry, CacheStore, HttpContext};
use serde_json::Value;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime},
};
use thiserror::Error;

/// Error produced by the failing doubles.
#[derive(Debug, Error)]
#[error("injected failure: {0}")]
pub struct InjectedFailure(pub &'static str);

// ============================================================================
// Recording Hook
// ============================================================================

/// A hook that records `"{phase}:{payload}"` for every call.
///
/// Can be told to short-circuit the request when running with a given
/// payload.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Arc::new(RecordingHook::new());
/// let registration = BoundHook::new(Arc::clone(&recorder), "auth".into()).on_controller("Users");
///
/// // dispatch...
///
/// assert_eq!(recorder.calls(), vec!["pre:auth", "post:auth"]);
/// ```
#[derive(Default)]
pub struct RecordingHook {
    calls: Mutex<Vec<String>>,
    short_circuit: Mutex<Option<(String, Value)>>,
}

impl RecordingHook {
    /// Create a new recording hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// When the pre-phase runs with `payload`, set `result` and respond
    /// immediately.
    pub fn short_circuit_on(&self, payload: &str, result: Value) {
        *self.short_circuit.lock().unwrap() = Some((payload.to_owned(), result));
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl ActionHook for RecordingHook {
    type Payload = String;

    fn name(&self) -> &str {
        "recording"
    }

    async fn on_pre_action(&self, ctx: &mut HttpContext, payload: &String) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(format!("pre:{payload}"));
        let short_circuit = self.short_circuit.lock().unwrap().clone();
        if let Some((trigger, result)) = short_circuit {
            if &trigger == payload {
                ctx.response.set_result(result);
                ctx.response.set_immediately();
            }
        }
        Ok(())
    }

    async fn on_post_action(&self, _ctx: &mut HttpContext, payload: &String) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(format!("post:{payload}"));
        Ok(())
    }
}

// ============================================================================
// Failing Hook
// ============================================================================

/// A hook that fails in the pre-phase, the post-phase, or both.
pub struct FailingHook {
    pre: bool,
    post: bool,
}

impl FailingHook {
    /// Fail in the pre-phase only.
    pub fn pre() -> Self {
        Self {
            pre: true,
            post: false,
        }
    }

    /// Fail in the post-phase only.
    pub fn post() -> Self {
        Self {
            pre: false,
            post: true,
        }
    }
}

impl ActionHook for FailingHook {
    type Payload = ();

    fn name(&self) -> &str {
        "failing"
    }

    async fn on_pre_action(&self, _ctx: &mut HttpContext, _: &()) -> Result<(), BoxError> {
        if self.pre {
            return Err(Box::new(InjectedFailure("pre-action")));
        }
        Ok(())
    }

    async fn on_post_action(&self, _ctx: &mut HttpContext, _: &()) -> Result<(), BoxError> {
        if self.post {
            return Err(Box::new(InjectedFailure("post-action")));
        }
        Ok(())
    }
}

// ============================================================================
// Counting Body
// ============================================================================

/// A body source that counts reads.
///
/// Clones share the counter, so keep one to inspect after handing the other
/// to a request.
#[derive(Clone)]
pub struct CountingBody {
    bytes: Vec<u8>,
    reads: Arc<AtomicUsize>,
}

impl CountingBody {
    /// Create a counting body over `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times the body was read.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BodySource for CountingBody {
    async fn read(&self) -> Result<Vec<u8>, BoxError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// A cache store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, BoxError> {
        Err(Box::new(InjectedFailure("store get")))
    }

    async fn create(&self, _key: &str, _entry: CacheEntry) -> Result<(), BoxError> {
        Err(Box::new(InjectedFailure("store create")))
    }

    async fn delete(&self, _key: &str) -> Result<(), BoxError> {
        Err(Box::new(InjectedFailure("store delete")))
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

/// A clock that stands still until advanced.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    /// Start at the current wall-clock time.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(SystemTime::now())),
        }
    }

    /// Current reading.
    pub fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}
