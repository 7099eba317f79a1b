//! Request dispatch.
//!
//! # Responsibilities
//! - Run the middleware chain to completion or first error
//! - Resolve the route and bind parameters into the context
//! - Invoke the matched handler and normalize its result
//! - Convert every request-time error into a response at this boundary
//!
//! # Data Flow
//! ```text
//! handle(method, path)
//!     → middleware chain (all, in discovery order)
//!         → on error: error response, handler never runs
//!     → router resolve
//!         → NoMatch / MethodMismatch: 404
//!     → bind params, invoke handler (standard or legacy)
//!     → normalize outcome / pass legacy response through
//! ```
//!
//! # Design Decisions
//! - The table snapshot is taken once per request; a concurrent rebuild
//!   never changes what an in-flight request observes
//! - NoMatch and MethodMismatch are expected outcomes, logged at debug
//! - Errors never escape this boundary; the process does not crash on a
//!   misbehaving handler

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use axum::response::Response;
use tokio_util::sync::CancellationToken;

use crate::config::RouterConfig;
use crate::dispatch::context::RequestContext;
use crate::dispatch::handler::HandlerRef;
use crate::dispatch::response::{handler_error_response, not_found, outcome_response};
use crate::middleware::chain::{self, ChainError};
use crate::observability::metrics;
use crate::routing::router::{resolve, MatchResult};
use crate::routing::table::SharedRouteTable;

/// Executes the middleware chain and the matched route handler for each
/// request.
pub struct Dispatcher {
    table: Arc<SharedRouteTable>,
    config: Arc<RouterConfig>,
}

impl Dispatcher {
    pub fn new(table: Arc<SharedRouteTable>, config: Arc<RouterConfig>) -> Self {
        Self { table, config }
    }

    /// Handle one request. Always produces a response.
    pub async fn handle(&self, method: Method, path: &str, cancel: CancellationToken) -> Response {
        let start = Instant::now();
        let (response, route_label) = self.dispatch(method.clone(), path, cancel).await;
        metrics::record_request(
            method.as_str(),
            response.status().as_u16(),
            &route_label,
            start,
        );
        response
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        cancel: CancellationToken,
    ) -> (Response, String) {
        let development = self.config.environment.is_development();
        let table = self.table.snapshot();
        let mut ctx = RequestContext::new(method.clone(), path, self.config.clone(), cancel);

        if let Err(error) = chain::run_all(table.middleware(), &mut ctx).await {
            return match error {
                ChainError::Misuse { source_path } => {
                    tracing::error!(
                        middleware = %source_path,
                        path = %path,
                        "middleware attempted to write a response"
                    );
                    let error = crate::dispatch::handler::HandlerError::internal(format!(
                        "middleware `{source_path}` attempted to write a response"
                    ));
                    (handler_error_response(&error, development), "none".into())
                }
                ChainError::Handler { source_path, error } => {
                    tracing::debug!(
                        middleware = %source_path,
                        status = %error.status,
                        "middleware rejected request"
                    );
                    (handler_error_response(&error, development), "none".into())
                }
            };
        }

        match resolve(&table, &method, path) {
            MatchResult::NoMatch => {
                tracing::debug!(method = %method, path = %path, "no route matched");
                (not_found(path), "none".into())
            }
            MatchResult::MethodMismatch => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    "path exists under a different method"
                );
                (not_found(path), "none".into())
            }
            MatchResult::Matched { route, params } => {
                let label = route.source_path.clone();
                ctx.bind_params(params);
                let response = match &route.handler {
                    HandlerRef::Standard(handler) => match handler.call(&mut ctx).await {
                        Ok(outcome) => outcome_response(outcome),
                        Err(error) => {
                            tracing::debug!(
                                route = %label,
                                status = %error.status,
                                error = %error,
                                "handler returned error"
                            );
                            handler_error_response(&error, development)
                        }
                    },
                    // Legacy handlers finalize the response themselves;
                    // pass it through without rewriting.
                    HandlerRef::Legacy(handler) => match handler.respond(&mut ctx).await {
                        Ok(response) => response,
                        Err(error) => {
                            tracing::debug!(
                                route = %label,
                                status = %error.status,
                                error = %error,
                                "legacy handler returned error"
                            );
                            handler_error_response(&error, development)
                        }
                    },
                };
                (response, label)
            }
        }
    }
}
