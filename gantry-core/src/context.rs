//! # Execution Contexts
//!
//! The live state a request carries through hooks, argument resolution and
//! the handler.
//!
//! - [`HttpContext`] - an HTTP request plus its mutable [`Response`]
//! - [`MessageContext`] - a message/RPC invocation; no URL, cookies or path
//!
//! The request body is pulled lazily from a [`BodySource`] (the transport
//! handle) and parsed according to [`BodyParseOptions`]. Reading the body is
//! the only suspension point of argument resolution.

use crate::error::{BoxError, ResolveError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Transport handle that yields the raw request body.
///
/// Implementations may be called more than once per request and must return
/// the same bytes each time.
#[async_trait]
pub trait BodySource: Send + Sync {
    /// Read the complete raw body.
    async fn read(&self) -> Result<Vec<u8>, BoxError>;
}

#[async_trait]
impl BodySource for Vec<u8> {
    async fn read(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.clone())
    }
}

#[async_trait]
impl BodySource for String {
    async fn read(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.as_bytes().to_vec())
    }
}

#[async_trait]
impl BodySource for &'static str {
    async fn read(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.as_bytes().to_vec())
    }
}

/// The format a body should be parsed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyKind {
    /// Pick by `content-type`.
    #[default]
    Auto,
    /// `serde_json` document.
    Json,
    /// UTF-8 text.
    Text,
    /// `application/x-www-form-urlencoded` pairs as a JSON object.
    Form,
    /// Raw bytes as a JSON array of numbers.
    Bytes,
}

impl BodyKind {
    fn label(self) -> &'static str {
        match self {
            BodyKind::Auto => "auto",
            BodyKind::Json => "json",
            BodyKind::Text => "text",
            BodyKind::Form => "form",
            BodyKind::Bytes => "bytes",
        }
    }

    fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyKind::Bytes;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime == "application/json" || mime.ends_with("+json") {
            BodyKind::Json
        } else if mime == "application/x-www-form-urlencoded" {
            BodyKind::Form
        } else if mime.starts_with("text/") {
            BodyKind::Text
        } else {
            BodyKind::Bytes
        }
    }
}

/// Options controlling how a request body is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyParseOptions {
    /// Target format.
    pub kind: BodyKind,
    /// Maximum accepted body size in bytes.
    pub limit: Option<usize>,
}

impl BodyParseOptions {
    /// Parse as the given kind with no size limit.
    pub const fn new(kind: BodyKind) -> Self {
        Self { kind, limit: None }
    }

    /// Reject bodies larger than `limit` bytes.
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An inbound HTTP request.
pub struct Request {
    method: String,
    url: String,
    headers: HashMap<String, String>,
    body: Box<dyn BodySource>,
}

impl Request {
    /// Create a request with an empty body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: Box::new(Vec::<u8>::new()),
        }
    }

    /// Add a header. Names are stored lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Attach the transport body handle.
    pub fn with_body(mut self, body: impl BodySource + 'static) -> Self {
        self.body = Box::new(body);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The full raw URL including the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Look up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers, keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Read and parse the body.
    pub async fn body(&self, options: &BodyParseOptions) -> Result<Value, ResolveError> {
        let raw = self.body.read().await.map_err(ResolveError::BodyRead)?;
        if let Some(limit) = options.limit {
            if raw.len() > limit {
                return Err(ResolveError::BodyTooLarge {
                    size: raw.len(),
                    limit,
                });
            }
        }
        if raw.is_empty() {
            return Ok(Value::Null);
        }

        let kind = match options.kind {
            BodyKind::Auto => BodyKind::from_content_type(self.header("content-type")),
            kind => kind,
        };
        parse_body(kind, raw)
    }
}

fn parse_body(kind: BodyKind, raw: Vec<u8>) -> Result<Value, ResolveError> {
    let parse_err = |source: BoxError| ResolveError::BodyParse {
        kind: kind.label(),
        source,
    };
    match kind {
        BodyKind::Json => serde_json::from_slice(&raw).map_err(|e| parse_err(e.into())),
        BodyKind::Text => String::from_utf8(raw)
            .map(Value::String)
            .map_err(|e| parse_err(e.into())),
        BodyKind::Form => {
            let fields: Map<String, Value> = url::form_urlencoded::parse(&raw)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            Ok(Value::Object(fields))
        }
        BodyKind::Bytes | BodyKind::Auto => {
            Ok(Value::Array(raw.into_iter().map(Value::from).collect()))
        }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The response being built for a request.
///
/// Hooks short-circuit a request by filling [`Response::set_result`] and
/// raising [`Response::set_immediately`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    result: Option<Value>,
    immediately: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            result: None,
            immediately: false,
        }
    }
}

impl Response {
    /// The produced result, if any.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Replace the produced result.
    pub fn set_result(&mut self, result: Value) {
        self.result = Some(result);
    }

    /// Ask the dispatcher to respond without running the handler.
    pub fn set_immediately(&mut self) {
        self.immediately = true;
    }

    /// Whether a hook asked to respond immediately.
    pub fn is_immediately(&self) -> bool {
        self.immediately
    }
}

/// Context of an HTTP invocation.
#[derive(Debug)]
pub struct HttpContext {
    /// The inbound request.
    pub request: Request,
    /// The response under construction.
    pub response: Response,
}

impl HttpContext {
    /// Create a context with a fresh response.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::default(),
        }
    }
}

/// Context of a message/RPC invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContext {
    /// The message pattern the handler was selected by.
    pub pattern: String,
    /// Transport-specific payload (headers, metadata).
    pub payload: Value,
}

impl MessageContext {
    /// Create a message context.
    pub fn new(pattern: impl Into<String>, payload: Value) -> Self {
        Self {
            pattern: pattern.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_auto_body_uses_content_type() {
        let req = Request::new("POST", "http://localhost/r")
            .with_header("Content-Type", "application/json; charset=utf-8")
            .with_body(r#"{"a":1}"#);

        let body = req.body(&BodyParseOptions::default()).await.unwrap();
        assert_eq!(body, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_form_body() {
        let req = Request::new("POST", "http://localhost/r").with_body("a=1&b=x%20y");

        let body = req
            .body(&BodyParseOptions::new(BodyKind::Form))
            .await
            .unwrap();
        assert_eq!(body, json!({"a": "1", "b": "x y"}));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let req = Request::new("POST", "http://localhost/r");
        let body = req
            .body(&BodyParseOptions::new(BodyKind::Json))
            .await
            .unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let req = Request::new("POST", "http://localhost/r").with_body("0123456789");
        let err = req
            .body(&BodyParseOptions::new(BodyKind::Text).with_limit(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::BodyTooLarge { size: 10, limit: 4 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let req = Request::new("POST", "http://localhost/r").with_body("{nope");
        let err = req
            .body(&BodyParseOptions::new(BodyKind::Json))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::BodyParse { kind: "json", .. }));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::new("GET", "/").with_header("X-Trace", "abc");
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert_eq!(req.header("X-TRACE"), Some("abc"));
    }

    #[test]
    fn test_response_short_circuit_flag() {
        let mut res = Response::default();
        assert!(!res.is_immediately());
        res.set_result(json!("cached"));
        res.set_immediately();
        assert!(res.is_immediately());
        assert_eq!(res.result(), Some(&json!("cached")));
    }
}
