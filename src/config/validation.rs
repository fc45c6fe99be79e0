//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check declared actions (unique names, valid status codes)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Compile every path (with group prefixes applied) and domain pattern
//!   before it reaches the registry
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::{ActionKind, GroupConfig, RouteConfig, RouterConfig};
use crate::routing::registry::join_prefixes;
use crate::routing::{DomainPattern, PathPattern, PatternError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid path pattern '{path}': {source}")]
    Path { path: String, source: PatternError },

    #[error("invalid domain pattern '{pattern}': {source}")]
    Domain { pattern: String, source: PatternError },

    #[error("action '{0}' is declared more than once")]
    DuplicateAction(String),

    #[error("action '{action}' has invalid status {status}")]
    InvalidStatus { action: String, status: u16 },
}

/// Validate a parsed configuration.
///
/// Action and middleware names are not checked here: application code may
/// register handlers the file never mentions. Name resolution against the
/// real handler table happens when the dispatcher is built.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError::Zero("rate_limit.requests_per_second"));
    }
    if config.rate_limit.burst_size == 0 {
        errors.push(ValidationError::Zero("rate_limit.burst_size"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut declared = HashSet::new();
    for action in &config.actions {
        if !declared.insert(action.name.as_str()) {
            errors.push(ValidationError::DuplicateAction(action.name.clone()));
        }
        let status = match &action.kind {
            ActionKind::Text { status, .. } | ActionKind::Redirect { status, .. } => Some(*status),
            ActionKind::Echo => None,
        };
        if let Some(status) = status {
            if StatusCode::from_u16(status).is_err() {
                errors.push(ValidationError::InvalidStatus {
                    action: action.name.clone(),
                    status,
                });
            }
        }
    }

    let mut checker = Checker {
        prefixes: Vec::new(),
        errors: &mut errors,
    };

    checker.routes(&config.routes);
    checker.groups(&config.groups);
    for domain in &config.domains {
        if let Err(source) = DomainPattern::parse(&domain.pattern) {
            checker.errors.push(ValidationError::Domain {
                pattern: domain.pattern.clone(),
                source,
            });
        }
        checker.routes(&domain.routes);
        checker.groups(&domain.groups);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Compiles paths exactly as the registry will see them.
struct Checker<'c> {
    prefixes: Vec<&'c str>,
    errors: &'c mut Vec<ValidationError>,
}

impl<'c> Checker<'c> {
    fn compile(&mut self, path: String) {
        if let Err(source) = PathPattern::parse(&path) {
            self.errors.push(ValidationError::Path { path, source });
        }
    }

    fn routes(&mut self, routes: &'c [RouteConfig]) {
        for route in routes {
            let full = join_prefixes(self.prefixes.iter().copied(), &route.path);
            self.compile(full);
        }
    }

    fn groups(&mut self, groups: &'c [GroupConfig]) {
        for group in groups {
            let pushed = match group.prefix.as_deref() {
                Some(prefix) => {
                    self.prefixes.push(prefix);
                    // An empty group still reports a broken prefix.
                    if group.routes.is_empty() && group.groups.is_empty() {
                        let full = join_prefixes(self.prefixes.iter().copied(), "");
                        self.compile(full);
                    }
                    true
                }
                None => false,
            };
            self.routes(&group.routes);
            self.groups(&group.groups);
            if pushed {
                self.prefixes.pop();
            }
        }
    }
}
