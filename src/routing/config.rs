//! Route declarations from configuration.
//!
//! Registration order follows the file: top-level routes, then groups,
//! then domain blocks (their routes, then their groups).

use crate::config::schema::{GroupConfig, RouteConfig, RouterConfig};
use crate::routing::error::RouteError;
use crate::routing::registry::{GroupAttributes, RouteRegistry};

/// Build a registry from the route tables of `config`.
pub fn build_registry(config: &RouterConfig) -> Result<RouteRegistry, RouteError> {
    let mut registry = RouteRegistry::new();

    if let Some(action) = &config.router.default_action {
        registry.set_default(action.as_str());
    }

    declare_routes(&mut registry, &config.routes)?;
    declare_groups(&mut registry, &config.groups)?;

    for domain in &config.domains {
        registry.domain(&domain.pattern, |r| {
            if let Some(action) = &domain.default_action {
                r.set_default(action.as_str());
            }
            declare_routes(r, &domain.routes)?;
            declare_groups(r, &domain.groups)
        })?;
    }

    Ok(registry)
}

fn declare_routes(registry: &mut RouteRegistry, routes: &[RouteConfig]) -> Result<(), RouteError> {
    for route in routes {
        registry
            .add_route(route.method, &route.path, route.action.as_str())?
            .middleware(route.middleware.iter().map(String::as_str));
    }
    Ok(())
}

fn declare_groups(registry: &mut RouteRegistry, groups: &[GroupConfig]) -> Result<(), RouteError> {
    for group in groups {
        let mut attributes = GroupAttributes::new().middleware(group.middleware.iter().map(String::as_str));
        if let Some(prefix) = &group.prefix {
            attributes = attributes.prefix(prefix.as_str());
        }
        registry.group(attributes, |r| {
            declare_routes(r, &group.routes)?;
            declare_groups(r, &group.groups)
        })?;
    }
    Ok(())
}
