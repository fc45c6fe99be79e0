//! Request dispatch.
//!
//! # Responsibilities
//! - Two-phase matching: domain-constrained routes, then shared routes
//! - Root-path fallback to domain defaults, then the global default
//! - Resolve action and middleware names through [`Handlers`]
//! - Run the middleware pipeline and the action
//!
//! # State Machine
//! ```text
//! Start → MatchingDomainRoutes → MatchingSharedRoutes → ResolvingDefault
//!       → Dispatch | NotFound
//! ```
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - First match in registration order wins within each phase
//! - Unresolvable names are errors, never silent 404s

use std::fmt;
use std::sync::Arc;

use axum::response::Response;

use crate::http::request::Request;
use crate::routing::domain::normalize_host;
use crate::routing::error::DispatchError;
use crate::routing::handlers::Handlers;
use crate::routing::middleware::{Middleware, Next};
use crate::routing::params::RouteParams;
use crate::routing::path::{is_root, normalize_path};
use crate::routing::registry::RouteTable;
use crate::routing::route::{Method, Route};

/// What a request resolves to, before anything is invoked.
#[derive(Debug)]
pub enum Resolution<'t> {
    Route { route: &'t Route, params: RouteParams },
    Default { action: &'t str, params: RouteParams },
    NotFound,
}

/// Result of a dispatch.
#[derive(Debug)]
pub enum Outcome {
    /// An action or a short-circuiting middleware produced a response.
    Handled(Response),
    NotFound,
    Error(DispatchError),
}

impl Outcome {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Handled(_) => "handled",
            Outcome::NotFound => "not_found",
            Outcome::Error(_) => "error",
        }
    }
}

/// Frozen route table plus the handlers its names resolve to.
pub struct Dispatcher {
    table: RouteTable,
    handlers: Handlers,
}

impl Dispatcher {
    pub fn new(table: RouteTable, handlers: Handlers) -> Self {
        Self { table, handlers }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Every action and middleware name in the table with no handler.
    ///
    /// Startup runs this so configuration bugs surface before traffic does.
    pub fn unresolved(&self) -> Vec<DispatchError> {
        let mut errors = Vec::new();

        for route in self.table.routes() {
            if self.handlers.resolve_action(route.action()).is_none() {
                errors.push(DispatchError::UnresolvedAction {
                    action: route.action().to_string(),
                    target: route.to_string(),
                });
            }
            for name in route.middleware() {
                if self.handlers.resolve_middleware(name).is_none() {
                    errors.push(DispatchError::UnresolvedMiddleware {
                        name: name.clone(),
                        target: route.to_string(),
                    });
                }
            }
        }

        let defaults = self
            .table
            .domain_defaults()
            .map(|(pattern, action)| (format!("default @ {}", pattern), action))
            .chain(
                self.table
                    .global_default()
                    .map(|action| ("global default".to_string(), action)),
            );
        for (target, action) in defaults {
            if self.handlers.resolve_action(action).is_none() {
                errors.push(DispatchError::UnresolvedAction {
                    action: action.to_string(),
                    target,
                });
            }
        }

        errors
    }

    /// Find the route or default for a request without invoking anything.
    pub fn resolve(&self, method: &str, path: &str, host: &str) -> Resolution<'_> {
        let host = normalize_host(host);
        let path = normalize_path(path);

        if let Ok(method) = method.parse::<Method>() {
            for route in self.table.domain_routes() {
                if route.method() != method {
                    continue;
                }
                let Some(domain) = route.domain() else {
                    continue;
                };
                let Some(domain_params) = domain.match_normalized(&host) else {
                    continue;
                };
                if let Some(path_params) = route.path().matches(&path) {
                    let params = RouteParams::new(domain_params, path_params, route.path().param_names());
                    return Resolution::Route { route, params };
                }
            }

            for route in self.table.shared_routes() {
                if route.method() != method {
                    continue;
                }
                if let Some(path_params) = route.path().matches(&path) {
                    let params = RouteParams::new(Default::default(), path_params, route.path().param_names());
                    return Resolution::Route { route, params };
                }
            }
        }

        if is_root(&path) {
            for (pattern, action) in self.table.domain_defaults() {
                if let Some(domain_params) = pattern.match_normalized(&host) {
                    return Resolution::Default {
                        action,
                        params: RouteParams::from_domain(domain_params),
                    };
                }
            }
            if let Some(action) = self.table.global_default() {
                return Resolution::Default {
                    action,
                    params: RouteParams::default(),
                };
            }
        }

        Resolution::NotFound
    }

    /// Dispatch a request through the matched route's pipeline.
    pub async fn dispatch(&self, request: Request) -> Outcome {
        let resolution = self.resolve(request.method(), request.path(), request.host());

        let outcome = match resolution {
            Resolution::Route { route, params } => {
                tracing::debug!(
                    request_id = request.request_id().unwrap_or("-"),
                    route = %route,
                    action = route.action(),
                    "Route matched"
                );
                self.run_route(route, params, request).await
            }
            Resolution::Default { action, params } => {
                tracing::debug!(
                    request_id = request.request_id().unwrap_or("-"),
                    host = request.host(),
                    action,
                    "Default route"
                );
                match self.handlers.resolve_action(action) {
                    Some(handler) => Outcome::Handled(handler.call(request, params).await),
                    None => Outcome::Error(DispatchError::UnresolvedAction {
                        action: action.to_string(),
                        target: "default route".to_string(),
                    }),
                }
            }
            Resolution::NotFound => {
                tracing::debug!(
                    request_id = request.request_id().unwrap_or("-"),
                    method = request.method(),
                    host = request.host(),
                    path = request.path(),
                    "No route matched"
                );
                Outcome::NotFound
            }
        };

        if let Outcome::Error(error) = &outcome {
            tracing::error!(error = %error, "Dispatch failed");
        }
        outcome
    }

    async fn run_route(&self, route: &Route, params: RouteParams, request: Request) -> Outcome {
        let Some(action) = self.handlers.resolve_action(route.action()) else {
            return Outcome::Error(DispatchError::UnresolvedAction {
                action: route.action().to_string(),
                target: route.to_string(),
            });
        };

        let chain: Result<Vec<Arc<dyn Middleware>>, DispatchError> = route
            .middleware()
            .iter()
            .map(|name| {
                self.handlers.resolve_middleware(name).cloned().ok_or_else(|| {
                    DispatchError::UnresolvedMiddleware {
                        name: name.clone(),
                        target: route.to_string(),
                    }
                })
            })
            .collect();
        let chain = match chain {
            Ok(chain) => chain,
            Err(error) => return Outcome::Error(error),
        };

        let target = route.to_string();
        let response = Next::new(&chain, action.as_ref(), &target, params)
            .run(request)
            .await;
        Outcome::Handled(response)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response;
    use crate::routing::registry::{GroupAttributes, RouteRegistry};
    use axum::http::StatusCode;
    use futures_util::future::BoxFuture;

    fn tagged(tag: &'static str) -> impl crate::routing::Action {
        move |_: Request, params: RouteParams| async move {
            response::text(StatusCode::OK, format!("{}:{}", tag, params.values().join(",")))
        }
    }

    async fn body(outcome: Outcome) -> String {
        match outcome {
            Outcome::Handled(response) => {
                let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
                String::from_utf8(bytes.to_vec()).unwrap()
            }
            other => panic!("expected a handled outcome, got {:?}", other),
        }
    }

    struct RedirectToLogin;

    impl Middleware for RedirectToLogin {
        fn handle<'a>(&'a self, _request: Request, _next: Next<'a>) -> BoxFuture<'a, Response> {
            Box::pin(async { response::redirect("/login") })
        }
    }

    #[test]
    fn test_domain_routes_win_over_earlier_shared_routes() {
        let mut registry = RouteRegistry::new();
        registry.get("/about", "shared/about").unwrap();
        registry
            .domain("example.com", |r| {
                r.get("/about", "example/about")?;
                Ok(())
            })
            .unwrap();
        let dispatcher = Dispatcher::new(registry.freeze(), Handlers::new());

        match dispatcher.resolve("GET", "/about", "www.example.com:8080") {
            Resolution::Route { route, .. } => assert_eq!(route.action(), "example/about"),
            other => panic!("unexpected resolution: {:?}", other),
        }
        match dispatcher.resolve("GET", "/about", "other.com") {
            Resolution::Route { route, .. } => assert_eq!(route.action(), "shared/about"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut registry = RouteRegistry::new();
        registry.get("/user/{id}", "user/show").unwrap();
        registry.get("/user/me", "user/me").unwrap();
        let dispatcher = Dispatcher::new(registry.freeze(), Handlers::new());

        match dispatcher.resolve("GET", "/user/me", "example.com") {
            Resolution::Route { route, params } => {
                assert_eq!(route.action(), "user/show");
                assert_eq!(params.path(), ["me"]);
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_method_must_match() {
        let mut registry = RouteRegistry::new();
        registry.post("/users", "users/store").unwrap();
        let dispatcher = Dispatcher::new(registry.freeze(), Handlers::new());

        assert!(matches!(dispatcher.resolve("GET", "/users", "example.com"), Resolution::NotFound));
        assert!(matches!(dispatcher.resolve("post", "/users", "example.com"), Resolution::NotFound));
        assert!(matches!(
            dispatcher.resolve("POST", "/users/", "example.com"),
            Resolution::Route { .. }
        ));
    }

    #[test]
    fn test_default_only_for_root() {
        let mut registry = RouteRegistry::new();
        registry.set_default("home/index");
        registry
            .domain("*.example.com", |r| {
                r.set_default("tenant/index");
                Ok(())
            })
            .unwrap();
        let dispatcher = Dispatcher::new(registry.freeze(), Handlers::new());

        match dispatcher.resolve("GET", "/", "shop.example.com") {
            Resolution::Default { action, params } => {
                assert_eq!(action, "tenant/index");
                assert_eq!(params.get("subdomain"), Some("shop"));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
        match dispatcher.resolve("DELETE", "", "example.com") {
            Resolution::Default { action, params } => {
                assert_eq!(action, "home/index");
                assert!(params.is_empty());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
        assert!(matches!(
            dispatcher.resolve("GET", "/missing", "shop.example.com"),
            Resolution::NotFound
        ));
    }

    #[tokio::test]
    async fn test_dispatch_merges_domain_and_path_params() {
        let mut registry = RouteRegistry::new();
        registry
            .domain("{tenant}.app.example.com", |r| {
                r.get("/projects/{project}", "projects/show")?;
                Ok(())
            })
            .unwrap();
        let mut handlers = Handlers::new();
        handlers.action("projects/show", tagged("show"));
        let dispatcher = Dispatcher::new(registry.freeze(), handlers);

        let outcome = dispatcher
            .dispatch(Request::new("GET", "/projects/42", "acme.app.example.com"))
            .await;
        assert_eq!(body(outcome).await, "show:acme,42");
    }

    #[tokio::test]
    async fn test_unresolved_names_are_errors_not_not_found() {
        let mut registry = RouteRegistry::new();
        registry.get("/missing-action", "nowhere/index").unwrap();
        registry.get("/missing-middleware", "home/index").unwrap().middleware(["ghost"]);
        registry.set_default("also/missing");
        let mut handlers = Handlers::new();
        handlers.action("home/index", tagged("home"));
        let dispatcher = Dispatcher::new(registry.freeze(), handlers);

        let unresolved = dispatcher.unresolved();
        assert_eq!(unresolved.len(), 3);

        let outcome = dispatcher.dispatch(Request::new("GET", "/missing-action", "localhost")).await;
        assert!(matches!(outcome, Outcome::Error(DispatchError::UnresolvedAction { .. })));

        let outcome = dispatcher.dispatch(Request::new("GET", "/missing-middleware", "localhost")).await;
        assert!(matches!(outcome, Outcome::Error(DispatchError::UnresolvedMiddleware { .. })));

        let outcome = dispatcher.dispatch(Request::new("GET", "/", "localhost")).await;
        assert!(matches!(outcome, Outcome::Error(DispatchError::UnresolvedAction { .. })));
        assert_eq!(outcome.label(), "error");
    }

    #[tokio::test]
    async fn test_application_middleware_overrides_framework() {
        let mut registry = RouteRegistry::new();
        registry
            .group(GroupAttributes::new().middleware(["auth"]), |r| {
                r.get("/protected", "secret/index")?;
                Ok(())
            })
            .unwrap();

        struct PassThrough;
        impl Middleware for PassThrough {
            fn handle<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
                next.run(request)
            }
        }

        let mut handlers = Handlers::new();
        handlers
            .action("secret/index", tagged("secret"))
            .framework_middleware("auth", RedirectToLogin)
            .middleware("auth", PassThrough);
        let dispatcher = Dispatcher::new(registry.freeze(), handlers);

        let outcome = dispatcher.dispatch(Request::new("GET", "/protected", "localhost")).await;
        assert_eq!(body(outcome).await, "secret:");
    }

    #[tokio::test]
    async fn test_middleware_sees_matched_route() {
        struct EchoRoute;
        impl Middleware for EchoRoute {
            fn handle<'a>(&'a self, _request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
                let route = next.route().to_string();
                Box::pin(async move { response::text(StatusCode::OK, route) })
            }
        }

        let mut registry = RouteRegistry::new();
        registry
            .domain("{tenant}.example.com", |r| {
                r.get("/user/{id}", "user/show")?.middleware(["echo"]);
                Ok(())
            })
            .unwrap();
        let mut handlers = Handlers::new();
        handlers.action("user/show", tagged("show")).middleware("echo", EchoRoute);
        let dispatcher = Dispatcher::new(registry.freeze(), handlers);

        for id in ["1", "2", "999"] {
            let path = format!("/user/{}", id);
            let outcome = dispatcher.dispatch(Request::new("GET", &path, "acme.example.com")).await;
            assert_eq!(body(outcome).await, "GET /user/{id} @ {tenant}.example.com");
        }
    }
}
