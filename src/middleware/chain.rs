//! Middleware chain execution.
//!
//! # Responsibilities
//! - Run every registered middleware in discovery order
//! - Propagate context mutations forward through the chain
//! - Enforce the contract that middleware never answers the request
//!
//! # Design Decisions
//! - Sequential execution on the same context; ordering is significant
//!   because earlier middleware set state later ones depend on
//! - First error halts the chain; the route handler never runs after a
//!   middleware failure
//! - A middleware producing anything besides "no content" fails the
//!   request instead of silently succeeding

use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::context::RequestContext;
use crate::dispatch::handler::{Handler, HandlerError, Outcome};

/// One registered middleware. Execution order equals directory-scan
/// discovery order.
#[derive(Clone)]
pub struct MiddlewareEntry {
    pub source_path: String,
    pub handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("source_path", &self.source_path)
            .finish()
    }
}

/// Failure while running the middleware chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A middleware tried to answer the request.
    #[error("middleware `{source_path}` attempted to write a response")]
    Misuse { source_path: String },

    /// A middleware raised an error; the chain halted there.
    #[error("middleware `{source_path}` failed: {error}")]
    Handler {
        source_path: String,
        error: HandlerError,
    },
}

/// Run every middleware in order on the shared context.
pub async fn run_all(
    entries: &[MiddlewareEntry],
    ctx: &mut RequestContext,
) -> Result<(), ChainError> {
    for entry in entries {
        match entry.handler.call(ctx).await {
            Ok(Outcome::NoContent) => {}
            Ok(_) => {
                return Err(ChainError::Misuse {
                    source_path: entry.source_path.clone(),
                });
            }
            Err(error) => {
                return Err(ChainError::Handler {
                    source_path: entry.source_path.clone(),
                    error,
                });
            }
        }
    }
    Ok(())
}
