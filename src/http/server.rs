//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (tracing, request ID, timeout, limits, headers)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Swap in a rebuilt dispatcher when configuration changes
//!
//! # Design Decisions
//! - The dispatcher lives behind an `ArcSwap`: reloads never block requests
//! - A failed reload keeps the current dispatcher
//! - Listener, timeout and body limits are fixed at startup

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    extract::{ConnectInfo, Request as HttpRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::request::{Request, UuidRequestId};
use crate::http::response;
use crate::lifecycle::startup::{build_dispatcher, build_handlers, StartupError};
use crate::observability::metrics;
use crate::routing::{Dispatcher, Handlers};
use crate::security::headers::with_security_headers;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("startup failed: {0}")]
    Startup(#[from] StartupError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
    pub max_body_size: usize,
}

/// HTTP server for the domain router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    app_handlers: Handlers,
    dispatcher: Arc<ArcSwap<Dispatcher>>,
}

impl HttpServer {
    /// Create a server whose actions all come from `config`.
    pub fn from_config(config: RouterConfig) -> Result<Self, StartupError> {
        Self::new(config, Handlers::new())
    }

    /// Create a server with application handlers layered over the
    /// config-declared actions and framework middleware.
    pub fn new(config: RouterConfig, app_handlers: Handlers) -> Result<Self, StartupError> {
        let dispatcher = assemble(&config, &app_handlers)?;
        let dispatcher = Arc::new(ArcSwap::from_pointee(dispatcher));

        let state = AppState {
            dispatcher: dispatcher.clone(),
            max_body_size: config.security.max_body_size,
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            app_handlers,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state);

        if config.security.enable_headers {
            router = with_security_headers(router);
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The dispatcher currently serving requests.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// Get a reference to the config the server started with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, applying validated configs
    /// from `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reloader = tokio::spawn(apply_reloads(
            config_updates,
            self.dispatcher.clone(),
            self.app_handlers.clone(),
            shutdown.resubscribe(),
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if shutdown.recv().await.is_err() {
                    tracing::debug!("Shutdown channel closed");
                }
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn assemble(config: &RouterConfig, app_handlers: &Handlers) -> Result<Dispatcher, StartupError> {
    let mut handlers = build_handlers(config);
    handlers.extend(app_handlers.clone());
    build_dispatcher(config, handlers)
}

async fn apply_reloads(
    mut updates: mpsc::UnboundedReceiver<RouterConfig>,
    dispatcher: Arc<ArcSwap<Dispatcher>>,
    app_handlers: Handlers,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else {
                    tracing::debug!("Config update channel closed");
                    break;
                };
                match assemble(&config, &app_handlers) {
                    Ok(rebuilt) => {
                        let routes = rebuilt.table().len();
                        dispatcher.store(Arc::new(rebuilt));
                        metrics::record_reload(true);
                        tracing::info!(routes, "Route table reloaded");
                    }
                    Err(e) => {
                        metrics::record_reload(false);
                        tracing::error!(error = %e, "Rejected reloaded config, keeping current route table");
                    }
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

/// Catch-all handler: buffer the body, then hand the request to the
/// current dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: HttpRequest) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Request body rejected");
            metrics::record_dispatch(parts.method.as_str(), "rejected", start);
            return response::text(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
        }
    };

    let request = Request::from_parts(&parts, body, remote_addr);
    let method = request.method().to_string();

    let dispatcher = state.dispatcher.load_full();
    let outcome = dispatcher.dispatch(request).await;

    metrics::record_dispatch(&method, outcome.label(), start);
    outcome.into_response()
}
