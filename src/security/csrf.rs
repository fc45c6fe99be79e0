//! Double-submit CSRF protection.
//!
//! Unsafe methods must echo the `csrf_token` cookie in the `X-CSRF-Token`
//! header. Safe methods pass through untouched.

use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::request::Request;
use crate::http::response;
use crate::routing::{Middleware, Next};

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

const PROTECTED_METHODS: [&str; 4] = ["POST", "PUT", "PATCH", "DELETE"];

/// The `csrf` middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Csrf;

impl Csrf {
    /// Whether `request` carries a matching token, or needs none.
    pub fn verify(request: &Request) -> bool {
        if !PROTECTED_METHODS.contains(&request.method()) {
            return true;
        }
        match (request.cookie(CSRF_COOKIE), request.header(CSRF_HEADER)) {
            (Some(cookie), Some(header)) if !cookie.is_empty() => constant_time_eq(cookie, header),
            _ => false,
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl Middleware for Csrf {
    fn handle<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        if Self::verify(&request) {
            return next.run(request);
        }

        tracing::warn!(
            request_id = request.request_id().unwrap_or("-"),
            method = request.method(),
            path = request.path(),
            "CSRF token missing or invalid"
        );
        Box::pin(async { response::text(StatusCode::FORBIDDEN, "CSRF token mismatch") })
    }
}
