//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers, body buffering)
//!     → request.rs (method, normalized path, host, request ID)
//!     → routing::Dispatcher (match, middleware, action)
//!     → actions.rs (config-declared actions)
//!     → response.rs (helpers, outcome mapping)
//!     → Send to client
//! ```

pub mod actions;
pub mod request;
pub mod response;
pub mod server;

pub use actions::ConfiguredAction;
pub use request::{Request, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
