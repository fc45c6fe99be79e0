//! Actions declared in configuration.

use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::BoxFuture;
use serde_json::json;

use crate::config::schema::ActionKind;
use crate::http::request::Request;
use crate::http::response;
use crate::routing::{Action, RouteParams};

/// An [`Action`] built from an `[[actions]]` entry.
#[derive(Debug, Clone)]
pub struct ConfiguredAction {
    kind: ActionKind,
}

impl ConfiguredAction {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind }
    }

    fn respond(&self, request: &Request, params: &RouteParams) -> Response {
        match &self.kind {
            ActionKind::Text {
                status,
                body,
                content_type,
            } => response::with_content_type(status_or_ok(*status), content_type, body.as_str()),
            ActionKind::Redirect { location, status } => {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::FOUND);
                response::redirect_with_status(status, location)
            }
            ActionKind::Echo => response::json(
                StatusCode::OK,
                json!({
                    "method": request.method(),
                    "host": request.host(),
                    "path": request.path(),
                    "query": request.query(),
                    "request_id": request.request_id(),
                    "params": params,
                }),
            ),
        }
    }
}

fn status_or_ok(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::OK)
}

impl Action for ConfiguredAction {
    fn call(&self, request: Request, params: RouteParams) -> BoxFuture<'static, Response> {
        let response = self.respond(&request, &params);
        Box::pin(async move { response })
    }
}
