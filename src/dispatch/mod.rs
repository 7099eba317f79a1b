//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path)
//!     → context.rs (per-request state)
//!     → middleware chain
//!     → routing resolve
//!     → handler.rs (standard or legacy callable)
//!     → response.rs (normalize outcome / error into HTTP response)
//! ```

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod response;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use handler::{Handler, HandlerError, HandlerRef, LegacyHandler, Outcome};
