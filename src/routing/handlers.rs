//! Name-to-handler resolution.
//!
//! Routes refer to actions and middleware by stable string identifiers.
//! [`Handlers`] maps those identifiers to concrete values once, at startup;
//! dispatch resolves them with a map lookup.
//!
//! Application middleware shadows framework middleware of the same name.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::request::Request;
use crate::routing::middleware::Middleware;
use crate::routing::params::RouteParams;

/// Terminal handler for a matched route or default.
pub trait Action: Send + Sync + 'static {
    fn call(&self, request: Request, params: RouteParams) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Action for F
where
    F: Fn(Request, RouteParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request, params: RouteParams) -> BoxFuture<'static, Response> {
        Box::pin(self(request, params))
    }
}

/// Registered actions and middleware.
#[derive(Clone, Default)]
pub struct Handlers {
    actions: HashMap<String, Arc<dyn Action>>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
    framework_middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application action.
    pub fn action(&mut self, name: impl Into<String>, action: impl Action) -> &mut Self {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Register application middleware.
    pub fn middleware(&mut self, name: impl Into<String>, middleware: impl Middleware) -> &mut Self {
        self.middleware.insert(name.into(), Arc::new(middleware));
        self
    }

    /// Register framework-provided middleware.
    pub fn framework_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: impl Middleware,
    ) -> &mut Self {
        self.framework_middleware
            .insert(name.into(), Arc::new(middleware));
        self
    }

    /// Merge `other` into `self`; entries from `other` win on name clashes.
    pub fn extend(&mut self, other: Handlers) {
        self.actions.extend(other.actions);
        self.middleware.extend(other.middleware);
        self.framework_middleware.extend(other.framework_middleware);
    }

    pub fn resolve_action(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    pub fn resolve_middleware(&self, name: &str) -> Option<&Arc<dyn Middleware>> {
        self.middleware
            .get(name)
            .or_else(|| self.framework_middleware.get(name))
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&String> = self.actions.keys().collect();
        let mut middleware: Vec<&String> = self.middleware.keys().collect();
        let mut framework: Vec<&String> = self.framework_middleware.keys().collect();
        actions.sort();
        middleware.sort();
        framework.sort();
        f.debug_struct("Handlers")
            .field("actions", &actions)
            .field("middleware", &middleware)
            .field("framework_middleware", &framework)
            .finish()
    }
}
