//! Route records.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::routing::domain::DomainPattern;
use crate::routing::path::PathPattern;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for request methods no route can be registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported method '{}'", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    /// Request methods are case-sensitive, as on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// A registered route.
///
/// Group prefixes and group middleware are already folded in: the record
/// holds the effective path and the full middleware list.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) path: PathPattern,
    pub(crate) action: String,
    pub(crate) middleware: Vec<String>,
    pub(crate) domain: Option<Arc<DomainPattern>>,
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    /// Identifier of the action handler.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Middleware names, in execution order.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// Domain constraint; `None` for shared routes.
    pub fn domain(&self) -> Option<&DomainPattern> {
        self.domain.as_deref()
    }

    pub fn is_shared(&self) -> bool {
        self.domain.is_none()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(domain) = &self.domain {
            write!(f, " @ {}", domain)?;
        }
        Ok(())
    }
}
