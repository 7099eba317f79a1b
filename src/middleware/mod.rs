//! Middleware subsystem.
//!
//! Middleware run on every request before route dispatch, in discovery
//! order, and may only inspect or extend the request context, never
//! answer the request.

pub mod chain;

pub use chain::{run_all, ChainError, MiddlewareEntry};
