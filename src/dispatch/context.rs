//! Per-request context.
//!
//! # Responsibilities
//! - Carry method, path, and bound route parameters through one request
//! - Give middleware a place to stash typed values for handlers
//! - Expose the cancellation signal and the server configuration
//!
//! # Design Decisions
//! - One context per request; never shared across requests
//! - Configuration is passed in explicitly rather than read from globals
//! - Extensions are keyed by type, mirroring how request extensions work
//!   in the HTTP stack

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{Extensions, Method};
use tokio_util::sync::CancellationToken;

use crate::config::RouterConfig;

/// Mutable state scoped to a single request's lifetime.
pub struct RequestContext {
    method: Method,
    path: String,
    params: HashMap<String, String>,
    /// Typed values set by middleware and read by handlers.
    pub extensions: Extensions,
    config: Arc<RouterConfig>,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        config: Arc<RouterConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            extensions: Extensions::new(),
            config,
            cancel,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// A bound route parameter, available after a successful match. The
    /// catch-all remainder is bound under `"_"`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Cancellation signal for this request. Triggered when the client
    /// disconnects; long-running handlers should observe it and release
    /// resources on every exit path.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn bind_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
