//! Route metadata consumed by the resolver and the hook pipeline.

use crate::param::ParameterDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered action and its declared parameters.
///
/// Owned by the metadata registry and shared across requests.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Controller the action belongs to.
    pub controller: String,
    /// Action (handler) name.
    pub action: String,
    /// HTTP method, or the message pattern for message routes.
    pub method: String,
    /// Route pattern as understood by the external matcher.
    pub pattern: String,
    /// Declared parameters, in registration order.
    pub params: Vec<ParameterDescriptor>,
}

impl RouteDefinition {
    /// Create a route with no parameters.
    pub fn new(
        controller: impl Into<String>,
        action: impl Into<String>,
        method: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            method: method.into(),
            pattern: pattern.into(),
            params: Vec::new(),
        }
    }

    /// Declare a parameter.
    pub fn param(mut self, descriptor: ParameterDescriptor) -> Self {
        self.params.push(descriptor);
        self
    }
}

/// The route matched for one request.
///
/// Immutable once the matcher has produced it.
#[derive(Debug, Clone)]
pub struct RouteMetadata {
    definition: Arc<RouteDefinition>,
    route_params: Option<HashMap<String, String>>,
}

impl RouteMetadata {
    /// Bind a definition to the path parameters extracted by the matcher.
    pub fn new(
        definition: Arc<RouteDefinition>,
        route_params: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            definition,
            route_params,
        }
    }

    /// A match without path parameters.
    pub fn without_params(definition: Arc<RouteDefinition>) -> Self {
        Self::new(definition, None)
    }

    /// The matched definition.
    pub fn definition(&self) -> &RouteDefinition {
        &self.definition
    }

    /// Declared parameters.
    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.definition.params
    }

    /// Controller name.
    pub fn controller(&self) -> &str {
        &self.definition.controller
    }

    /// Action name.
    pub fn action(&self) -> &str {
        &self.definition.action
    }

    /// Path parameter by name.
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }
}
