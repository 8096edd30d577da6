//! # Argument Resolution
//!
//! Turns a route's declared [`ParameterDescriptor`]s into the positional
//! argument list a handler is invoked with.
//!
//! Descriptors are ordered by `index` (stable, so equal indices keep
//! registration order) and the output is dense: the n-th argument belongs to
//! the n-th descriptor in that order, whatever the gaps between indices.
//!
//! Missing data resolves to [`Argument::Absent`]. Only body reads, body
//! parsing and body transforms can fail.

use gantry_core::{
    Argument, ContextRef, HttpContext, MessageContext, ParamKind,
    ParameterDescriptor, QueryMap, ResolveError, RouteMetadata, TransformConfig,
};
use serde_json::Value;
use std::collections::HashMap;

/// Resolve the arguments of an HTTP invocation.
///
/// Routes without parameters return immediately without touching the body.
/// The body is read once per `Body` descriptor; that read is the only
/// suspension point.
pub async fn resolve<'c>(
    ctx: &'c HttpContext,
    route: &RouteMetadata,
    transforms: Option<&TransformConfig>,
) -> Result<Vec<Argument<'c>>, ResolveError> {
    let params = route.params();
    if params.is_empty() {
        return Ok(Vec::new());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        controller = route.controller(),
        action = route.action(),
        params = params.len(),
        "resolving arguments"
    );

    let request = &ctx.request;
    let query = query_params(request.url());
    let mut cookies: Option<HashMap<String, String>> = None;
    let mut args = Vec::with_capacity(params.len());

    for param in sorted(params) {
        let arg = match &param.kind {
            ParamKind::Query => match (&query, param.name.as_deref()) {
                (Some(pairs), Some(name)) => Argument::from_option(
                    pairs
                        .iter()
                        .find(|(key, _)| key == name)
                        .filter(|(_, value)| !value.is_empty())
                        .map(|(_, value)| Value::String(value.clone())),
                ),
                _ => Argument::Absent,
            },
            ParamKind::QueryObject => match &query {
                Some(pairs) => {
                    let map: QueryMap = pairs.iter().cloned().collect();
                    if map.is_empty() {
                        Argument::Absent
                    } else {
                        Argument::Query(map)
                    }
                }
                None => Argument::Absent,
            },
            ParamKind::Cookie => match param.name.as_deref() {
                Some(name) => {
                    let jar = cookies.get_or_insert_with(|| {
                        parse_cookies(request.header("cookie").unwrap_or_default())
                    });
                    Argument::from_option(jar.get(name).cloned().map(Value::String))
                }
                None => Argument::Absent,
            },
            ParamKind::Body => Argument::Value(read_body(ctx, param, transforms).await?),
            ParamKind::Request => Argument::Request(&ctx.request),
            ParamKind::Response => Argument::Response(&ctx.response),
            ParamKind::Context => Argument::Context(ContextRef::Http(ctx)),
            ParamKind::RouteParam => match param.name.as_deref() {
                Some(name) => Argument::from_option(
                    route
                        .route_param(name)
                        .map(|value| Value::String(value.to_owned())),
                ),
                None => Argument::Absent,
            },
            ParamKind::Unsupported(_) => Argument::Absent,
        };
        args.push(arg);
    }

    Ok(args)
}

/// Resolve the arguments of a message invocation.
///
/// Only `Context` and `Body` are meaningful for messages; every other kind
/// resolves to absent.
pub fn resolve_for_message<'c>(
    ctx: &'c MessageContext,
    route: &RouteMetadata,
    body: &Value,
) -> Vec<Argument<'c>> {
    sorted(route.params())
        .into_iter()
        .map(|param| match param.kind {
            ParamKind::Body => Argument::Value(body.clone()),
            ParamKind::Context => Argument::Context(ContextRef::Message(ctx)),
            _ => Argument::Absent,
        })
        .collect()
}

/// Decoded `key=value` pairs of a URL's query string, in order.
///
/// Returns `None` when the URL has no query string or it is empty.
pub fn query_params(url: &str) -> Option<Vec<(String, String)>> {
    let (_, query) = url.split_once('?')?;
    let query = query.split(['?', '#']).next().unwrap_or_default();
    if query.is_empty() {
        return None;
    }
    Some(
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
    )
}

/// Parse a `Cookie` header into a name/value map.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

fn sorted(params: &[ParameterDescriptor]) -> Vec<&ParameterDescriptor> {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by_key(|param| param.index);
    sorted
}

async fn read_body(
    ctx: &HttpContext,
    param: &ParameterDescriptor,
    transforms: Option<&TransformConfig>,
) -> Result<Value, ResolveError> {
    let options = param.body_options.unwrap_or_default();
    let body = ctx.request.body(&options).await?;

    let Some(transform) = &param.transform else {
        return Ok(body);
    };

    let configured = transforms.and_then(|config| config.get(&param.kind));
    let result = match configured {
        Some(set) => set.transform(transform, body),
        None => transform.apply(body),
    };
    result.map_err(ResolveError::Transform)
}
