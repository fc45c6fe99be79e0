//! Routing error types.
//!
//! Pattern and registration errors surface while routes are declared and
//! abort startup. Dispatch errors surface per request and indicate a
//! configuration bug (a name with no handler behind it), never a missing
//! resource.

use thiserror::Error;

use crate::routing::route::Method;

/// A path or domain pattern that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("unbalanced braces in '{segment}' of pattern '{pattern}'")]
    Unbalanced { pattern: String, segment: String },

    #[error("empty placeholder name in pattern '{pattern}'")]
    EmptyName { pattern: String },

    #[error("invalid placeholder name '{name}' in pattern '{pattern}'")]
    InvalidName { pattern: String, name: String },

    #[error("placeholder in '{segment}' of pattern '{pattern}' must span the whole segment")]
    Embedded { pattern: String, segment: String },

    #[error("placeholder '{name}' appears more than once in pattern '{pattern}'")]
    Duplicate { pattern: String, name: String },

    #[error("domain pattern '{pattern}' mixes wildcard and parameter forms")]
    Mixed { pattern: String },

    #[error("domain pattern '{pattern}' may only use '*' as a leading '*.' label")]
    MisplacedWildcard { pattern: String },

    #[error("domain pattern '{pattern}' contains an empty label")]
    EmptyLabel { pattern: String },
}

/// Failure while registering a route or entering a domain block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid path for route {method} '{path}': {source}")]
    Path {
        method: Method,
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("invalid domain pattern '{pattern}': {source}")]
    Domain {
        pattern: String,
        #[source]
        source: PatternError,
    },
}

/// A matched route or default whose names cannot be resolved to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("action '{action}' for {target} has no registered handler")]
    UnresolvedAction { action: String, target: String },

    #[error("middleware '{name}' for {target} has no registered handler")]
    UnresolvedMiddleware { name: String, target: String },
}
