//! Handler traits and return-value model.
//!
//! # Responsibilities
//! - Define the callable shape routes and middleware are registered with
//! - Model handler results as data for the dispatcher to normalize
//! - Model "fail with an HTTP status" as a typed error value
//!
//! # Design Decisions
//! - Two handler variants, dispatched explicitly: standard handlers return
//!   an [`Outcome`] the dispatcher serializes; legacy handlers produce a
//!   finished response the dispatcher passes through untouched
//! - Errors carry their status explicitly and propagate with `?`; no
//!   panicking control flow

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::dispatch::context::RequestContext;

/// Error raised by a handler or middleware, carrying the response status.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// An unexpected failure; maps to 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Value returned by a standard handler, normalized by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Serialized as a JSON body with status 200.
    Json(serde_json::Value),
    /// Sent as a plain-text body with status 200.
    Text(String),
    /// Status 204. The only value a middleware may produce.
    NoContent,
}

/// A route or middleware callable.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut RequestContext) -> Result<Outcome, HandlerError>;
}

/// Escape hatch for handlers that write the response themselves. The
/// dispatcher must not rewrite what these return.
#[async_trait]
pub trait LegacyHandler: Send + Sync {
    async fn respond(&self, ctx: &mut RequestContext) -> Result<Response, HandlerError>;
}

/// Reference to a registered handler.
#[derive(Clone)]
pub enum HandlerRef {
    Standard(Arc<dyn Handler>),
    Legacy(Arc<dyn LegacyHandler>),
}

impl HandlerRef {
    pub fn standard(handler: impl Handler + 'static) -> Self {
        HandlerRef::Standard(Arc::new(handler))
    }

    pub fn legacy(handler: impl LegacyHandler + 'static) -> Self {
        HandlerRef::Legacy(Arc::new(handler))
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Standard(_) => f.write_str("HandlerRef::Standard"),
            HandlerRef::Legacy(_) => f.write_str("HandlerRef::Legacy"),
        }
    }
}
