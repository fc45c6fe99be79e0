//! Request handling.
//!
//! # Responsibilities
//! - Carry the routing-relevant parts of an HTTP request (method, path, host)
//! - Normalize the path the way route patterns are normalized
//! - Expose headers, cookies, body and peer address to middleware and actions
//! - Generate request IDs (UUID v4) for correlation
//!
//! # Design Decisions
//! - Request ID assigned by a tower-http layer before dispatch
//! - Host falls back to the URI authority, then `localhost`
//! - Extensions let middleware hand context to later stages

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{header, request::Parts, Extensions, HeaderMap, HeaderName, HeaderValue};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::path::normalize_path;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const DEFAULT_HOST: &str = "localhost";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// A request as seen by the dispatcher, middleware and actions.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    host: String,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    extensions: Extensions,
}

impl Request {
    /// Build a request from a method, a path (optionally with a query
    /// string) and a host.
    pub fn new(method: impl Into<String>, uri: &str, host: impl Into<String>) -> Self {
        let query = uri
            .split_once('?')
            .map(|(_, query)| query.to_string())
            .filter(|query| !query.is_empty());
        Self {
            method: method.into(),
            path: normalize_path(uri),
            query,
            host: host.into(),
            ..Self::default()
        }
    }

    /// Build a request from the parts of an incoming HTTP request.
    pub fn from_parts(parts: &Parts, body: Bytes, remote_addr: Option<SocketAddr>) -> Self {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self {
            method: parts.method.as_str().to_string(),
            path: normalize_path(parts.uri.path()),
            query: parts.uri.query().map(str::to_string),
            host,
            headers: parts.headers.clone(),
            body,
            remote_addr,
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Normalized path, without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Host as received, port included.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of cookie `name` from the `Cookie` header(s).
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Correlation ID assigned by the HTTP layer, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
