//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! file tree (routes/, api/, middleware/)
//!     → scan.rs (deterministic enumeration)
//!     → HandlerResolver (source path → registered callable)
//!     → RouteTableBuilder (compile patterns, order middleware)
//!     → immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - The scanner is the sole consumer of directory-listing results
//! - A discovered file without a registered handler is fatal at build
//!   time, not a silent gap in the table
//! - Build-time errors abort startup before the listener binds

pub mod scan;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::config::DiscoveryConfig;
use crate::dispatch::handler::HandlerRef;
use crate::routing::table::{BuildError, RouteTable};

pub use scan::{scan_tree, DiscoveredFile, RouteKind, ScanError};

/// Maps discovered files to their registered callables.
pub trait HandlerResolver {
    fn handler_for(&self, file: &DiscoveredFile) -> Option<HandlerRef>;
}

/// Fatal discovery failure; reported to the operator before serving begins.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("no handler registered for discovered file `{path}`")]
    MissingHandler { path: String },
}

/// Scan the route tree and compile it into a table, resolving each
/// discovered file to its handler.
pub fn build_table(
    root: &Path,
    discovery: &DiscoveryConfig,
    resolver: &dyn HandlerResolver,
) -> Result<RouteTable, DiscoveryError> {
    let files = scan_tree(root, discovery)?;

    let mut builder = RouteTable::builder()
        .with_api_prefix(discovery.api_prefix.as_str())
        .with_extensions(&discovery.source_extensions);

    let mut route_count = 0usize;
    let mut middleware_count = 0usize;
    for file in &files {
        let handler = resolver
            .handler_for(file)
            .ok_or_else(|| DiscoveryError::MissingHandler {
                path: file.source_path.clone(),
            })?;
        match file.kind {
            RouteKind::Route => {
                builder.route(&file.source_path, handler)?;
                route_count += 1;
            }
            RouteKind::Api => {
                builder.api_route(&file.source_path, handler)?;
                route_count += 1;
            }
            RouteKind::Middleware => {
                builder.middleware(&file.source_path, handler)?;
                middleware_count += 1;
            }
        }
    }

    tracing::info!(
        routes = route_count,
        middleware = middleware_count,
        "route table built from discovery"
    );
    Ok(builder.build())
}

/// Handler registry keyed by conventional directory and relative path.
/// The common [`HandlerResolver`] used by programs that register their
/// callables up front.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(RouteKind, String), HandlerRef>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a file under the routes directory.
    pub fn route(&mut self, source_path: &str, handler: HandlerRef) -> &mut Self {
        self.handlers
            .insert((RouteKind::Route, source_path.to_string()), handler);
        self
    }

    /// Register a handler for a file under the API directory.
    pub fn api(&mut self, source_path: &str, handler: HandlerRef) -> &mut Self {
        self.handlers
            .insert((RouteKind::Api, source_path.to_string()), handler);
        self
    }

    /// Register a handler for a file under the middleware directory.
    pub fn middleware(&mut self, source_path: &str, handler: HandlerRef) -> &mut Self {
        self.handlers
            .insert((RouteKind::Middleware, source_path.to_string()), handler);
        self
    }
}

impl HandlerResolver for HandlerRegistry {
    fn handler_for(&self, file: &DiscoveredFile) -> Option<HandlerRef> {
        self.handlers
            .get(&(file.kind, file.source_path.clone()))
            .cloned()
    }
}
