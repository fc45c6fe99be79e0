//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, pattern compilation)
//!     → RouterConfig (validated, immutable)
//!     → routing::config builds the RouteRegistry from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → http::server rebuilds the Dispatcher and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ActionConfig, ActionKind, DomainConfig, GroupConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RateLimitConfig, RouteConfig, RouterConfig, RouterSettings,
    SecurityConfig, TimeoutConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
