//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route with middleware names:
//!     → rate_limit.rs (per client and route token bucket)
//!     → csrf.rs (double-submit token check on unsafe methods)
//!     → action
//!
//! Every response:
//!     → headers.rs (nosniff, frame options)
//! ```
//!
//! # Design Decisions
//! - Framework middleware is registered under fixed names; application
//!   middleware with the same name takes precedence
//! - Fail closed: reject on any security check failure

pub mod csrf;
pub mod headers;
pub mod rate_limit;

pub use csrf::Csrf;
pub use rate_limit::RateLimit;

use crate::config::schema::RouterConfig;
use crate::routing::Handlers;

pub const RATE_LIMIT: &str = "rate_limit";
pub const CSRF: &str = "csrf";

/// Register the framework middleware, configured from `config`.
pub fn install_framework_middleware(handlers: &mut Handlers, config: &RouterConfig) {
    handlers
        .framework_middleware(RATE_LIMIT, RateLimit::new(&config.rate_limit))
        .framework_middleware(CSRF, Csrf);
}
