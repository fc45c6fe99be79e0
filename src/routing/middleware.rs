//! Middleware pipeline.
//!
//! # Data Flow
//! ```text
//! Next::run(request)
//!     → middleware[0].handle(request, next)
//!         → next.run(request) → middleware[1].handle(...)
//!             → ... → action.call(request, params)
//! ```
//!
//! A middleware that returns a response without calling [`Next::run`]
//! short-circuits: later middleware and the action never run.

use axum::response::Response;
use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::http::request::Request;
use crate::routing::handlers::Action;
use crate::routing::params::RouteParams;

/// Request interceptor resolved by name from [`crate::routing::Handlers`].
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response>;
}

/// Continuation bound to the rest of the chain, ending in the action.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    action: &'a dyn Action,
    route: &'a str,
    params: RouteParams,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        chain: &'a [Arc<dyn Middleware>],
        action: &'a dyn Action,
        route: &'a str,
        params: RouteParams,
    ) -> Self {
        Self {
            chain,
            action,
            route,
            params,
        }
    }

    /// The matched route as registered, e.g. `GET /user/{id} @ example.com`.
    ///
    /// Unlike the request path this takes one value per route.
    pub fn route(&self) -> &'a str {
        self.route
    }

    /// Parameters the action will receive.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Number of middleware still ahead of the action.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }

    /// Continue with the next middleware, or the action at the end.
    pub fn run(self, request: Request) -> BoxFuture<'a, Response> {
        match self.chain.split_first() {
            Some((head, rest)) => {
                tracing::trace!(remaining = rest.len(), "Running middleware");
                head.handle(request, Next::new(rest, self.action, self.route, self.params))
            }
            None => {
                tracing::trace!("Middleware chain complete, calling action");
                self.action.call(request, self.params)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn handle<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}:before", self.name));
                let response = next.run(request).await;
                self.log.lock().unwrap().push(format!("{}:after", self.name));
                response
            })
        }
    }

    struct Deny;

    impl Middleware for Deny {
        fn handle<'a>(&'a self, _request: Request, _next: Next<'a>) -> BoxFuture<'a, Response> {
            Box::pin(async { response::text(StatusCode::FORBIDDEN, "denied") })
        }
    }

    fn recording_action(log: Arc<Mutex<Vec<String>>>) -> impl Action {
        move |_: Request, _: RouteParams| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push("action".to_string());
                response::text(StatusCode::OK, "done")
            }
        }
    }

    #[tokio::test]
    async fn test_chain_wraps_action_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder { name: "first", log: log.clone() }),
            Arc::new(Recorder { name: "second", log: log.clone() }),
        ];
        let action = recording_action(log.clone());

        let next = Next::new(&chain, &action, "GET /", RouteParams::default());
        assert_eq!(next.remaining(), 2);
        assert_eq!(next.route(), "GET /");
        let response = next.run(Request::new("GET", "/", "localhost")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:before", "second:before", "action", "second:after", "first:after"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_stops_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder { name: "first", log: log.clone() }),
            Arc::new(Deny),
            Arc::new(Recorder { name: "third", log: log.clone() }),
        ];
        let action = recording_action(log.clone());

        let response = Next::new(&chain, &action, "GET /", RouteParams::default())
            .run(Request::new("GET", "/", "localhost"))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), vec!["first:before", "first:after"]);
    }
}
