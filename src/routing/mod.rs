//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     RouteRegistry (get/post/.../group/domain/set_default)
//!     → pattern.rs compiles path and domain patterns (fail fast)
//!     → freeze() → RouteTable (immutable)
//!     → Dispatcher { RouteTable, Handlers }
//!
//! Incoming Request (method, host, path):
//!     → dispatcher.rs normalizes host and path
//!     → domain.rs + path.rs: domain-constrained routes first, then shared
//!     → middleware.rs runs the chain, ending in the action
//!     → Outcome: Handled(response) | NotFound | Error
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the hot path (token lists only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod inspect;
pub mod middleware;
pub mod params;
pub mod path;
pub mod pattern;
pub mod registry;
pub mod route;

pub use dispatcher::{Dispatcher, Outcome, Resolution};
pub use domain::{normalize_host, DomainKind, DomainPattern};
pub use error::{DispatchError, PatternError, RouteError};
pub use handlers::{Action, Handlers};
pub use middleware::{Middleware, Next};
pub use params::{DomainParams, RouteParams};
pub use path::PathPattern;
pub use registry::{GroupAttributes, RouteHandle, RouteRegistry, RouteTable};
pub use route::{Method, Route};
