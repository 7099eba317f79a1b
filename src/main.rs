//! File-system route server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 FSROUTER                      │
//!                    │                                               │
//!   route files ─────┼─▶ discovery ──▶ pattern ──▶ route table       │
//!   (routes/, api/,  │     scan        compiler     (atomic swap)    │
//!    middleware/)    │                                  │            │
//!                    │                                  ▼            │
//!   HTTP request ────┼─▶ http server ──▶ middleware ──▶ router ──▶   │
//!                    │    (axum)          chain         resolve      │
//!                    │                                  │            │
//!   HTTP response ◀──┼── response ◀── dispatcher ◀── handler         │
//!                    │   normalize                                   │
//!                    │                                               │
//!                    │  cross-cutting: config · logging · metrics    │
//!                    │                 lifecycle (graceful shutdown) │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! Without an embedded handler language, the binary serves every
//! discovered route with an inspector handler that echoes the matched
//! route and its bound parameters, enough to exercise and debug a route
//! tree end to end.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use fsrouter::config::{load_config, RouterConfig};
use fsrouter::discovery::{build_table, DiscoveredFile, HandlerResolver, RouteKind};
use fsrouter::dispatch::{Handler, HandlerError, HandlerRef, Outcome, RequestContext};
use fsrouter::http::HttpServer;
use fsrouter::lifecycle::Shutdown;
use fsrouter::observability::{logging, metrics};
use fsrouter::routing::SharedRouteTable;

#[derive(Parser)]
#[command(name = "fsrouter")]
#[command(about = "Serve a file-system route tree", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Log the compiled route table and exit without serving.
    #[arg(long)]
    print_routes: bool,
}

/// Echoes the matched route and bound parameters as JSON.
struct RouteInspector {
    source_path: String,
}

#[async_trait]
impl Handler for RouteInspector {
    async fn call(&self, ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Json(json!({
            "route": self.source_path,
            "method": ctx.method().as_str(),
            "path": ctx.path(),
            "params": ctx.params(),
        })))
    }
}

/// Logs each request as it passes through the chain.
struct TraceMiddleware {
    source_path: String,
}

#[async_trait]
impl Handler for TraceMiddleware {
    async fn call(&self, ctx: &mut RequestContext) -> Result<Outcome, HandlerError> {
        tracing::debug!(
            middleware = %self.source_path,
            method = %ctx.method(),
            path = %ctx.path(),
            "middleware pass"
        );
        Ok(Outcome::NoContent)
    }
}

/// Gives every discovered file an inspector handler.
struct InspectorResolver;

impl HandlerResolver for InspectorResolver {
    fn handler_for(&self, file: &DiscoveredFile) -> Option<HandlerRef> {
        let handler = match file.kind {
            RouteKind::Middleware => HandlerRef::standard(TraceMiddleware {
                source_path: file.source_path.clone(),
            }),
            RouteKind::Route | RouteKind::Api => HandlerRef::standard(RouteInspector {
                source_path: file.source_path.clone(),
            }),
        };
        Some(handler)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.environment);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root = %config.discovery.root,
        "configuration loaded"
    );

    let table = match build_table(
        Path::new(&config.discovery.root),
        &config.discovery,
        &InspectorResolver,
    ) {
        Ok(table) => table,
        Err(error) => {
            tracing::error!(error = %error, "route table build failed");
            return ExitCode::FAILURE;
        }
    };

    for route in table.routes() {
        tracing::info!(
            route = %route.source_path,
            method = route.method.as_ref().map(|m| m.as_str()).unwrap_or("*"),
            prefix = route.prefix.as_deref().unwrap_or(""),
            "route registered"
        );
    }
    for entry in table.middleware() {
        tracing::info!(middleware = %entry.source_path, "middleware registered");
    }
    if cli.print_routes {
        return ExitCode::SUCCESS;
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "failed to parse metrics address"
                );
            }
        }
    }

    let config = Arc::new(config);
    let shared = Arc::new(SharedRouteTable::new(table));
    let server = HttpServer::new(config.clone(), shared);

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(error = %error, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    if let Err(error) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %error, "server exited with error");
        return ExitCode::FAILURE;
    }

    tracing::info!("shutdown complete");
    ExitCode::SUCCESS
}

fn load(cli: &Cli) -> Result<RouterConfig, String> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| format!("failed to load config: {e}"))?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    Ok(config)
}
