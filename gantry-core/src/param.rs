//! # Parameter Sources
//!
//! A handler declares where each of its positional arguments comes from with
//! a list of [`ParameterDescriptor`]s. The resolver turns that list into
//! [`Argument`]s.
//!
//! Missing source data never fails resolution; it yields [`Argument::Absent`].

use crate::context::{BodyParseOptions, HttpContext, MessageContext, Request, Response};
use crate::error::BoxError;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Decoded query string as a key/value mapping.
pub type QueryMap = BTreeMap<String, String>;

/// Where an argument value is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A single named query-string value.
    Query,
    /// The whole query string as a mapping.
    QueryObject,
    /// A named cookie.
    Cookie,
    /// The parsed (and optionally transformed) request body.
    Body,
    /// The request itself.
    Request,
    /// The response itself.
    Response,
    /// The execution context itself.
    Context,
    /// A named path parameter.
    RouteParam,
    /// A source this version does not know; always resolves to absent.
    Unsupported(Cow<'static, str>),
}

/// Function signature of a body transform.
pub type TransformFn = dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync;

/// A named body transform.
///
/// The name identifies the transform to a [`TransformSet`], which may replace
/// the function with its own implementation.
#[derive(Clone)]
pub struct Transform {
    name: Cow<'static, str>,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Create a transform from a name and a function.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The transform's identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transform to a raw body.
    pub fn apply(&self, body: Value) -> Result<Value, BoxError> {
        (self.func)(body)
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// A globally configured family of transforms for one parameter kind.
///
/// Lets body conversion be reconfigured (for example swapping a validation
/// library) without touching the handlers that declare transforms.
pub trait TransformSet: Send + Sync {
    /// Look up the implementation for `transform` and apply it to `body`.
    fn transform(&self, transform: &Transform, body: Value) -> Result<Value, BoxError>;
}

impl<F> TransformSet for F
where
    F: Fn(&Transform, Value) -> Result<Value, BoxError> + Send + Sync,
{
    fn transform(&self, transform: &Transform, body: Value) -> Result<Value, BoxError> {
        self(transform, body)
    }
}

/// Transform sets keyed by the parameter kind they apply to.
#[derive(Clone, Default)]
pub struct TransformConfig {
    sets: HashMap<ParamKind, Arc<dyn TransformSet>>,
}

impl TransformConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the transform set for a kind.
    pub fn with(mut self, kind: ParamKind, set: impl TransformSet + 'static) -> Self {
        self.sets.insert(kind, Arc::new(set));
        self
    }

    /// Look up the transform set for a kind.
    pub fn get(&self, kind: &ParamKind) -> Option<&dyn TransformSet> {
        self.sets.get(kind).map(|set| set.as_ref())
    }
}

impl std::fmt::Debug for TransformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.sets.keys()).finish()
    }
}

/// Declares the source of one handler argument.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Argument position. Unique per route; gaps are allowed.
    pub index: usize,
    /// Source kind.
    pub kind: ParamKind,
    /// Key for `Query`, `Cookie` and `RouteParam`.
    pub name: Option<String>,
    /// Body transform.
    pub transform: Option<Transform>,
    /// Body parse options.
    pub body_options: Option<BodyParseOptions>,
}

impl ParameterDescriptor {
    /// A descriptor with no name, transform or body options.
    pub fn new(index: usize, kind: ParamKind) -> Self {
        Self {
            index,
            kind,
            name: None,
            transform: None,
            body_options: None,
        }
    }

    fn named(index: usize, kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(index, kind)
        }
    }

    /// A named query value.
    pub fn query(index: usize, name: impl Into<String>) -> Self {
        Self::named(index, ParamKind::Query, name)
    }

    /// The whole query string.
    pub fn query_object(index: usize) -> Self {
        Self::new(index, ParamKind::QueryObject)
    }

    /// A named cookie.
    pub fn cookie(index: usize, name: impl Into<String>) -> Self {
        Self::named(index, ParamKind::Cookie, name)
    }

    /// The request body.
    pub fn body(index: usize) -> Self {
        Self::new(index, ParamKind::Body)
    }

    /// The request.
    pub fn request(index: usize) -> Self {
        Self::new(index, ParamKind::Request)
    }

    /// The response.
    pub fn response(index: usize) -> Self {
        Self::new(index, ParamKind::Response)
    }

    /// The execution context.
    pub fn context(index: usize) -> Self {
        Self::new(index, ParamKind::Context)
    }

    /// A named path parameter.
    pub fn route_param(index: usize, name: impl Into<String>) -> Self {
        Self::named(index, ParamKind::RouteParam, name)
    }

    /// Attach a body transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Attach body parse options.
    pub fn with_body_options(mut self, options: BodyParseOptions) -> Self {
        self.body_options = Some(options);
        self
    }
}

/// Borrowed execution context handed to a `Context` parameter.
#[derive(Debug, Clone, Copy)]
pub enum ContextRef<'c> {
    /// An HTTP invocation.
    Http(&'c HttpContext),
    /// A message invocation.
    Message(&'c MessageContext),
}

/// A resolved handler argument.
#[derive(Debug, Clone)]
pub enum Argument<'c> {
    /// No value; the source data was missing or the kind is unsupported.
    Absent,
    /// A scalar or structured value (query, cookie, path parameter, body).
    Value(Value),
    /// The decoded query string.
    Query(QueryMap),
    /// The request.
    Request(&'c Request),
    /// The response.
    Response(&'c Response),
    /// The execution context.
    Context(ContextRef<'c>),
}

impl<'c> Argument<'c> {
    /// Whether this argument is [`Argument::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }

    /// The value, if this is [`Argument::Value`].
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The string, if this is a string [`Argument::Value`].
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// The mapping, if this is [`Argument::Query`].
    pub fn as_query(&self) -> Option<&QueryMap> {
        match self {
            Argument::Query(map) => Some(map),
            _ => None,
        }
    }

    /// Wrap an optional value, mapping `None` to absent.
    pub fn from_option(value: Option<Value>) -> Self {
        value.map_or(Argument::Absent, Argument::Value)
    }
}
