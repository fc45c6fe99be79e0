//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use domain_router::http::response;
use domain_router::http::{HttpServer, Request, ServerError};
use domain_router::routing::{Action, Handlers, Outcome, RouteParams};
use domain_router::{RouterConfig, Shutdown};

/// Action answering `<tag>:<param values joined by ','>`.
#[allow(dead_code)]
pub fn tagged(tag: &'static str) -> impl Action {
    move |_: Request, params: RouteParams| async move {
        response::text(StatusCode::OK, format!("{}:{}", tag, params.values().join(",")))
    }
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Body of a handled outcome; panics on not-found or errors.
#[allow(dead_code)]
pub async fn handled_body(outcome: Outcome) -> String {
    match outcome {
        Outcome::Handled(response) => body_text(response).await,
        other => panic!("expected a handled outcome, got {:?}", other),
    }
}

/// A server running on an ephemeral local port.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<RouterConfig>,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

#[allow(dead_code)]
pub async fn start_server(config: RouterConfig, handlers: Handlers) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, handlers).unwrap();
    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let handle = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    RunningServer {
        addr,
        shutdown,
        updates,
        handle,
    }
}

/// HTTP client that does not follow redirects.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
