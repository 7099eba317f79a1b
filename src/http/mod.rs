//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, wildcard route)
//!     → request.rs (request ID)
//!     → dispatch::Dispatcher (middleware chain + route table)
//!     → Response
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
