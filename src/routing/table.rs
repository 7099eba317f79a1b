//! The compiled route table.
//!
//! # Responsibilities
//! - Hold every compiled route descriptor plus the ordered middleware list
//! - Detect conflicting route registrations at build time
//! - Support atomic replacement of the whole table for live rebuilds
//!
//! # Design Decisions
//! - Immutable after `build()`; request processing never locks
//! - Rebuilds swap an `Arc` pointer, so in-flight requests keep the
//!   snapshot they started with and new requests see the new table
//! - Middleware entries are sorted with the same comparator the directory
//!   scanner walks with, so manual registration and discovery agree on
//!   execution order

use std::cmp::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method;
use thiserror::Error;

use crate::dispatch::handler::HandlerRef;
use crate::middleware::chain::MiddlewareEntry;
use crate::routing::pattern::{
    compile_route, InvalidPattern, SegmentSpec, DEFAULT_SOURCE_EXTENSIONS,
};

/// Compiled representation of one handler's matching rule. Immutable after
/// build; rebuilds replace the whole table.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// Relative route-file path this descriptor was compiled from.
    pub source_path: String,
    /// Restricting method suffix; `None` matches any method.
    pub method: Option<Method>,
    /// Leading static context (e.g. "/api"); not a pattern segment.
    pub prefix: Option<String>,
    pub segments: Vec<SegmentSpec>,
    pub handler: HandlerRef,
}

/// Fatal route-table construction failure. Reported to the operator before
/// serving begins.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPattern),

    #[error("route `{path}` conflicts with already-registered `{existing}`")]
    DuplicateRoute { path: String, existing: String },

    #[error("middleware `{path}` must not produce a response; register a standard handler")]
    LegacyMiddleware { path: String },
}

/// Immutable index of compiled routes and ordered middleware.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    middleware: Vec<MiddlewareEntry>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Middleware in execution order.
    pub fn middleware(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }
}

/// Builder for [`RouteTable`]. Single writer at build time; the result is
/// frozen before any request sees it.
pub struct RouteTableBuilder {
    api_prefix: String,
    extensions: Vec<String>,
    routes: Vec<RouteDescriptor>,
    middleware: Vec<MiddlewareEntry>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            routes: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Override the prefix applied by [`api_route`](Self::api_route).
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Override the recognized source extensions.
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Register a route file with no prefix.
    pub fn route(&mut self, source_path: &str, handler: HandlerRef) -> Result<(), BuildError> {
        self.add_route(source_path, None, handler)
    }

    /// Register a route file served under the API prefix.
    pub fn api_route(&mut self, source_path: &str, handler: HandlerRef) -> Result<(), BuildError> {
        self.add_route(source_path, Some(self.api_prefix.clone()), handler)
    }

    /// Register a middleware file. Middleware must be standard handlers;
    /// a legacy handler here is rejected because it exists to write
    /// responses, which middleware are forbidden to do.
    pub fn middleware(&mut self, source_path: &str, handler: HandlerRef) -> Result<(), BuildError> {
        match handler {
            HandlerRef::Standard(handler) => {
                self.middleware.push(MiddlewareEntry {
                    source_path: source_path.to_string(),
                    handler,
                });
                Ok(())
            }
            HandlerRef::Legacy(_) => Err(BuildError::LegacyMiddleware {
                path: source_path.to_string(),
            }),
        }
    }

    fn add_route(
        &mut self,
        source_path: &str,
        prefix: Option<String>,
        handler: HandlerRef,
    ) -> Result<(), BuildError> {
        let compiled = compile_route(source_path, &self.extensions)?;
        let descriptor = RouteDescriptor {
            source_path: source_path.to_string(),
            method: compiled.method,
            prefix,
            segments: compiled.segments,
            handler,
        };

        let key = pattern_key(&descriptor);
        if let Some(existing) = self.routes.iter().find(|r| pattern_key(r) == key) {
            return Err(BuildError::DuplicateRoute {
                path: source_path.to_string(),
                existing: existing.source_path.clone(),
            });
        }

        self.routes.push(descriptor);
        Ok(())
    }

    /// Freeze the table. Middleware is ordered the way a depth-first
    /// lexicographic directory walk discovers it.
    pub fn build(mut self) -> RouteTable {
        self.middleware
            .sort_by(|a, b| scan_order(&a.source_path, &b.source_path));
        RouteTable {
            routes: self.routes,
            middleware: self.middleware,
        }
    }
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two relative paths the way the directory scanner visits them:
/// component-wise, so a directory's contents sort before a sibling file
/// whose name extends the directory's name.
pub fn scan_order(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('/').collect();
    let b_parts: Vec<&str> = b.split('/').collect();
    a_parts.cmp(&b_parts)
}

/// Identity of a route's matching rule: prefix, segment shape, and method.
/// Two routes with the same key would be indistinguishable to the router.
fn pattern_key(route: &RouteDescriptor) -> String {
    let mut key = route.prefix.clone().unwrap_or_default();
    for segment in &route.segments {
        key.push('/');
        match segment {
            SegmentSpec::Static(literal) => key.push_str(literal),
            SegmentSpec::Named(_) => key.push_str("[]"),
            SegmentSpec::CatchAll => key.push_str("[...]"),
        }
    }
    key.push('#');
    match &route.method {
        Some(method) => key.push_str(method.as_str()),
        None => key.push('*'),
    }
    key
}

/// Shared handle to the current route table. Rebuilds are atomic pointer
/// swaps observed consistently by in-flight and new requests.
pub struct SharedRouteTable {
    inner: ArcSwap<RouteTable>,
}

impl SharedRouteTable {
    pub fn new(table: RouteTable) -> Self {
        Self {
            inner: ArcSwap::from_pointee(table),
        }
    }

    /// The table snapshot for one request. Holders keep this snapshot even
    /// if a rebuild lands mid-request.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.inner.load_full()
    }

    /// Replace the table. New requests observe the new table immediately.
    pub fn replace(&self, table: RouteTable) {
        self.inner.store(Arc::new(table));
    }
}
