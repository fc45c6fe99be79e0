//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::Method;

/// Root configuration for the domain router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Settings for the `rate_limit` middleware.
    pub rate_limit: RateLimitConfig,

    pub security: SecurityConfig,

    /// Global default and handler strictness.
    pub router: RouterSettings,

    /// Config-driven actions, referenced by name from routes.
    pub actions: Vec<ActionConfig>,

    /// Shared routes (no domain constraint).
    pub routes: Vec<RouteConfig>,

    /// Prefix/middleware groups of shared routes.
    pub groups: Vec<GroupConfig>,

    /// Domain blocks.
    pub domains: Vec<DomainConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for a request, middleware and action included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Tokens refilled per second for each (client, path) bucket.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 100,
            burst_size: 50,
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add `X-Content-Type-Options` and `X-Frame-Options` to every response.
    pub enable_headers: bool,

    /// Maximum buffered request body in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Action used for `/` when no route or domain default applies.
    pub default_action: Option<String>,

    /// Refuse to start when any route names an unknown action or middleware.
    pub strict_handlers: bool,
}

/// A named, config-driven action.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    pub name: String,

    #[serde(flatten)]
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Fixed response body.
    Text {
        #[serde(default = "default_status")]
        status: u16,
        body: String,
        #[serde(default = "default_content_type")]
        content_type: String,
    },

    /// Redirect to a fixed location.
    Redirect {
        location: String,
        #[serde(default = "default_redirect_status")]
        status: u16,
    },

    /// JSON dump of the request and its route parameters.
    Echo,
}

fn default_status() -> u16 {
    200
}

fn default_redirect_status() -> u16 {
    302
}

fn default_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

/// A single route declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub method: Method,

    /// Path pattern, e.g. `/user/{id}`.
    pub path: String,

    /// Action identifier.
    pub action: String,

    /// Route-level middleware, appended after group middleware.
    #[serde(default)]
    pub middleware: Vec<String>,
}

/// A group of routes sharing a prefix and middleware.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    pub prefix: Option<String>,
    pub middleware: Vec<String>,
    pub routes: Vec<RouteConfig>,
    pub groups: Vec<GroupConfig>,
}

/// Routes and default constrained to a host pattern.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Host pattern: exact, `{param}` labels, or `*.base`.
    pub pattern: String,

    /// Action for `/` on matching hosts.
    #[serde(default)]
    pub default_action: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}
