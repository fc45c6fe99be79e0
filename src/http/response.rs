//! Response construction.
//!
//! # Responsibilities
//! - Helpers for actions and middleware (text, JSON, redirect, errors)
//! - Map dispatch outcomes to HTTP responses
//!
//! # Design Decisions
//! - Not found is a plain 404, distinct from dispatch errors (500)
//! - Dispatch error details go to logs, never to the client

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::routing::Outcome;

/// Plain-text response.
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

/// Response with an explicit content type.
pub fn with_content_type(status: StatusCode, content_type: &str, body: impl Into<String>) -> Response {
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("text/plain; charset=utf-8"));
    (status, [(header::CONTENT_TYPE, content_type)], body.into()).into_response()
}

/// JSON response.
pub fn json(status: StatusCode, value: serde_json::Value) -> Response {
    (status, Json(value)).into_response()
}

/// `302 Found` redirect.
pub fn redirect(location: &str) -> Response {
    redirect_with_status(StatusCode::FOUND, location)
}

/// Redirect with a caller-chosen 3xx status.
pub fn redirect_with_status(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
        Err(_) => error("Invalid redirect location"),
    }
}

pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "Page Not Found")
}

pub fn error(message: &str) -> Response {
    text(StatusCode::INTERNAL_SERVER_ERROR, message)
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Handled(response) => response,
            Outcome::NotFound => not_found(),
            Outcome::Error(_) => error("Internal Server Error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::DispatchError;

    #[test]
    fn test_redirect_sets_location() {
        let response = redirect("/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn test_outcome_status_codes() {
        assert_eq!(Outcome::NotFound.into_response().status(), StatusCode::NOT_FOUND);

        let error = Outcome::Error(DispatchError::UnresolvedAction {
            action: "home/index".into(),
            target: "GET /".into(),
        });
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let handled = Outcome::Handled(text(StatusCode::ACCEPTED, "ok"));
        assert_eq!(handled.into_response().status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_content_type_helper() {
        let response = with_content_type(StatusCode::OK, "text/html", "<h1>hi</h1>");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>hi</h1>");
    }
}
