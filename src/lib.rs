//! Domain-aware HTTP request router.
//!
//! Routes are declared per HTTP method, optionally inside prefix/middleware
//! groups and domain blocks, then frozen into an immutable table. Each
//! request is matched in two phases (domain-constrained routes, then shared
//! routes), falls back to domain or global defaults on `/`, and runs through
//! its middleware chain into the named action.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, Handlers, RouteRegistry};
