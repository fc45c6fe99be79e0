//! Route registration.
//!
//! # Responsibilities
//! - Accumulate routes in registration order
//! - Apply group prefixes and group middleware (outer to inner)
//! - Attach the active domain constraint
//! - Record global and per-domain default actions
//! - Freeze into an immutable [`RouteTable`] for serving
//!
//! # Design Decisions
//! - Group context is captured by value when a route is registered
//! - Patterns compile on registration; bad patterns never reach serving
//! - Middleware is appended through a [`RouteHandle`], not by index

use std::sync::Arc;

use crate::routing::domain::DomainPattern;
use crate::routing::error::RouteError;
use crate::routing::path::PathPattern;
use crate::routing::route::{Method, Route};

/// Attributes shared by every route declared inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    prefix: Option<String>,
    middleware: Vec<String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix; surrounding slashes are ignored.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Middleware applied to every route in the group.
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Mutable access to a just-registered route.
#[derive(Debug)]
pub struct RouteHandle<'r> {
    route: &'r mut Route,
}

impl<'r> RouteHandle<'r> {
    /// Append middleware after any inherited from groups.
    pub fn middleware<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route
            .middleware
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn route(&self) -> &Route {
        self.route
    }
}

/// Registration-time route collection.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    group_stack: Vec<GroupAttributes>,
    current_domain: Option<Arc<DomainPattern>>,
    global_default: Option<String>,
    domain_defaults: Vec<(Arc<DomainPattern>, String)>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &str, action: impl Into<String>) -> Result<RouteHandle<'_>, RouteError> {
        self.add_route(Method::Get, path, action)
    }

    pub fn post(&mut self, path: &str, action: impl Into<String>) -> Result<RouteHandle<'_>, RouteError> {
        self.add_route(Method::Post, path, action)
    }

    pub fn put(&mut self, path: &str, action: impl Into<String>) -> Result<RouteHandle<'_>, RouteError> {
        self.add_route(Method::Put, path, action)
    }

    pub fn patch(&mut self, path: &str, action: impl Into<String>) -> Result<RouteHandle<'_>, RouteError> {
        self.add_route(Method::Patch, path, action)
    }

    pub fn delete(&mut self, path: &str, action: impl Into<String>) -> Result<RouteHandle<'_>, RouteError> {
        self.add_route(Method::Delete, path, action)
    }

    /// Register a route under the active group and domain context.
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        action: impl Into<String>,
    ) -> Result<RouteHandle<'_>, RouteError> {
        let full_path = self.apply_group_prefix(path);
        let pattern = PathPattern::parse(&full_path).map_err(|source| RouteError::Path {
            method,
            path: full_path.clone(),
            source,
        })?;

        let route = Route {
            method,
            path: pattern,
            action: action.into(),
            middleware: self.group_middleware(),
            domain: self.current_domain.clone(),
        };
        tracing::debug!(route = %route, action = %route.action, "Route registered");

        self.routes.push(route);
        let index = self.routes.len() - 1;
        Ok(RouteHandle {
            route: &mut self.routes[index],
        })
    }

    fn apply_group_prefix(&self, path: &str) -> String {
        join_prefixes(
            self.group_stack.iter().filter_map(|g| g.prefix.as_deref()),
            path,
        )
    }

    fn group_middleware(&self) -> Vec<String> {
        self.group_stack
            .iter()
            .flat_map(|g| g.middleware.iter().cloned())
            .collect()
    }

    /// Declare routes inside a group.
    ///
    /// The group is popped again even if `routes` fails.
    pub fn group<F>(&mut self, attributes: GroupAttributes, routes: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        self.group_stack.push(attributes);
        let result = routes(self);
        self.group_stack.pop();
        result
    }

    /// Declare routes constrained to hosts matching `pattern`.
    ///
    /// A nested domain block replaces the outer constraint for its duration.
    pub fn domain<F>(&mut self, pattern: &str, routes: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let compiled = DomainPattern::parse(pattern).map_err(|source| RouteError::Domain {
            pattern: pattern.to_string(),
            source,
        })?;

        let outer = self.current_domain.replace(Arc::new(compiled));
        let result = routes(self);
        self.current_domain = outer;
        result
    }

    /// Set the root fallback action for the active domain, or globally.
    pub fn set_default(&mut self, action: impl Into<String>) {
        let action = action.into();
        match &self.current_domain {
            Some(domain) => {
                let existing = self
                    .domain_defaults
                    .iter_mut()
                    .find(|(pattern, _)| pattern.as_str() == domain.as_str());
                match existing {
                    Some((_, current)) => *current = action,
                    None => self.domain_defaults.push((domain.clone(), action)),
                }
            }
            None => self.global_default = Some(action),
        }
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Stop registration and produce the serving table.
    pub fn freeze(self) -> RouteTable {
        let (domain_routes, shared_routes): (Vec<Route>, Vec<Route>) =
            self.routes.into_iter().partition(|r| r.domain.is_some());

        tracing::debug!(
            domain_routes = domain_routes.len(),
            shared_routes = shared_routes.len(),
            domain_defaults = self.domain_defaults.len(),
            global_default = self.global_default.is_some(),
            "Route table frozen"
        );

        RouteTable {
            domain_routes,
            shared_routes,
            domain_defaults: self.domain_defaults,
            global_default: self.global_default,
        }
    }
}

/// Join group prefixes, outermost first, onto `path`.
pub(crate) fn join_prefixes<'p, I>(prefixes: I, path: &str) -> String
where
    I: IntoIterator<Item = &'p str>,
{
    let mut full = String::new();
    for prefix in prefixes {
        let prefix = prefix.trim_matches('/');
        if !prefix.is_empty() {
            full.push('/');
            full.push_str(prefix);
        }
    }
    full.push('/');
    full.push_str(path.trim_matches('/'));
    full
}

/// Immutable route table, safe to share across concurrent dispatches.
#[derive(Debug, Default)]
pub struct RouteTable {
    domain_routes: Vec<Route>,
    shared_routes: Vec<Route>,
    domain_defaults: Vec<(Arc<DomainPattern>, String)>,
    global_default: Option<String>,
}

impl RouteTable {
    /// Domain-constrained routes, in registration order.
    pub fn domain_routes(&self) -> &[Route] {
        &self.domain_routes
    }

    /// Unconstrained routes, in registration order.
    pub fn shared_routes(&self) -> &[Route] {
        &self.shared_routes
    }

    /// Every route, domain-constrained first.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.domain_routes.iter().chain(self.shared_routes.iter())
    }

    pub fn domain_defaults(&self) -> impl Iterator<Item = (&DomainPattern, &str)> {
        self.domain_defaults
            .iter()
            .map(|(pattern, action)| (pattern.as_ref(), action.as_str()))
    }

    pub fn global_default(&self) -> Option<&str> {
        self.global_default.as_deref()
    }

    pub fn len(&self) -> usize {
        self.domain_routes.len() + self.shared_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
