//! Metadata registry assembled at startup.
//!
//! Routes, parameter descriptors and hook registrations are collected by a
//! [`RegistryBuilder`] during application assembly. [`RegistryBuilder::build`]
//! validates them and produces an immutable [`MetadataRegistry`] that request
//! handling only reads.

use crate::pipeline::HookPipeline;
use gantry_core::{HookRegistration, ParameterDescriptor, RegistryError, RouteDefinition};
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only collection of routes and hooks.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    routes: Vec<Arc<RouteDefinition>>,
    hooks: Vec<HookRegistration>,
}

impl MetadataRegistry {
    /// Start assembling a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up a route by controller and action.
    pub fn route(&self, controller: &str, action: &str) -> Option<&Arc<RouteDefinition>> {
        self.routes
            .iter()
            .find(|route| route.controller == controller && route.action == action)
    }

    /// All routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.iter()
    }

    /// Hooks applying to `controller::action`, in registration order.
    pub fn hooks_for<'r, 'a>(
        &'r self,
        controller: &'a str,
        action: &'a str,
    ) -> impl Iterator<Item = &'r HookRegistration> + use<'r, 'a> {
        self.hooks
            .iter()
            .filter(move |hook| hook.matches(controller, action))
    }

    /// The pipeline of hooks applying to `controller::action`.
    pub fn pipeline_for(&self, controller: &str, action: &str) -> HookPipeline<'_> {
        HookPipeline::new(self.hooks_for(controller, action).collect())
    }
}

/// Builder for constructing a [`MetadataRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routes: Vec<RouteDefinition>,
    params: Vec<(String, String, ParameterDescriptor)>,
    hooks: Vec<HookRegistration>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Declare a parameter for a route registered anywhere in this builder.
    pub fn param(
        mut self,
        controller: impl Into<String>,
        action: impl Into<String>,
        descriptor: ParameterDescriptor,
    ) -> Self {
        self.params.push((controller.into(), action.into(), descriptor));
        self
    }

    /// Register a hook. Hooks run in registration order.
    pub fn hook(mut self, registration: HookRegistration) -> Self {
        self.hooks.push(registration);
        self
    }

    /// Validate and build the registry.
    ///
    /// Fails on duplicate routes, duplicate parameter indices within a route,
    /// and parameters declared for unknown routes.
    pub fn build(self) -> Result<MetadataRegistry, RegistryError> {
        let mut routes = self.routes;

        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert((route.controller.as_str(), route.action.as_str())) {
                return Err(RegistryError::DuplicateRoute {
                    controller: route.controller.clone(),
                    action: route.action.clone(),
                });
            }
        }

        for (controller, action, descriptor) in self.params {
            let Some(route) = routes
                .iter_mut()
                .find(|route| route.controller == controller && route.action == action)
            else {
                return Err(RegistryError::UnknownRoute { controller, action });
            };
            route.params.push(descriptor);
        }

        for route in &routes {
            let mut indices = HashSet::new();
            for param in &route.params {
                if !indices.insert(param.index) {
                    return Err(RegistryError::DuplicateParamIndex {
                        controller: route.controller.clone(),
                        action: route.action.clone(),
                        index: param.index,
                    });
                }
            }
        }

        Ok(MetadataRegistry {
            routes: routes.into_iter().map(Arc::new).collect(),
            hooks: self.hooks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_get() -> RouteDefinition {
        RouteDefinition::new("Users", "get", "GET", "/users/:id")
    }

    #[test]
    fn test_params_attach_to_routes() {
        let registry = MetadataRegistry::builder()
            .route(users_get().param(ParameterDescriptor::route_param(0, "id")))
            .param("Users", "get", ParameterDescriptor::query(1, "fields"))
            .build()
            .unwrap();

        let route = registry.route("Users", "get").unwrap();
        assert_eq!(route.params.len(), 2);
        assert!(registry.route("Users", "list").is_none());
        assert_eq!(registry.routes().count(), 1);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let err = MetadataRegistry::builder()
            .route(users_get().param(ParameterDescriptor::query(0, "a")))
            .param("Users", "get", ParameterDescriptor::query(0, "b"))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateParamIndex {
                controller: "Users".into(),
                action: "get".into(),
                index: 0,
            }
        );
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = MetadataRegistry::builder()
            .route(users_get())
            .route(users_get())
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_param_for_unknown_route_rejected() {
        let err = MetadataRegistry::builder()
            .param("Ghost", "get", ParameterDescriptor::body(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownRoute { .. }));
    }
}
