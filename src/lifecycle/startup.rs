//! Startup orchestration.
//!
//! # Responsibilities
//! - Register config-driven actions and framework middleware
//! - Build and freeze the route table
//! - Check that every name in the table resolves
//!
//! # Design Decisions
//! - Fail fast: pattern errors are fatal
//! - Unresolved names are fatal only with `router.strict_handlers`;
//!   otherwise they are logged and surface as 500s at dispatch

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::http::actions::ConfiguredAction;
use crate::routing::config::build_registry;
use crate::routing::{DispatchError, Dispatcher, Handlers, RouteError};
use crate::security::install_framework_middleware;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route table: {0}")]
    Route(#[from] RouteError),

    #[error("{} unresolved handler name(s): {}", .0.len(), join(.0))]
    Unresolved(Vec<DispatchError>),
}

fn join(errors: &[DispatchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Handlers for the config-declared actions plus framework middleware.
pub fn build_handlers(config: &RouterConfig) -> Handlers {
    let mut handlers = Handlers::new();
    for action in &config.actions {
        handlers.action(action.name.as_str(), ConfiguredAction::new(action.kind.clone()));
    }
    install_framework_middleware(&mut handlers, config);
    handlers
}

/// Build the dispatcher for `config` using `handlers`.
///
/// Applications that register actions in code pass their own handler
/// table; [`build_handlers`] is the config-only default.
pub fn build_dispatcher(config: &RouterConfig, handlers: Handlers) -> Result<Dispatcher, StartupError> {
    let table = build_registry(config)?.freeze();
    let dispatcher = Dispatcher::new(table, handlers);

    let unresolved = dispatcher.unresolved();
    if !unresolved.is_empty() {
        if config.router.strict_handlers {
            return Err(StartupError::Unresolved(unresolved));
        }
        for error in &unresolved {
            tracing::warn!(error = %error, "Unresolved handler name");
        }
    }

    tracing::info!(
        routes = dispatcher.table().len(),
        actions = config.actions.len(),
        "Route table built"
    );
    Ok(dispatcher)
}
