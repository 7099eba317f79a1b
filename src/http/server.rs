//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router that funnels every request into the dispatcher
//! - Wire up middleware layers (timeout, request ID, tracing)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - A single wildcard route delegates all matching to the route table;
//!   the HTTP framework performs no routing of its own
//! - Each request gets a cancellation token cancelled when the connection
//!   goes away, surfaced to handlers through the request context

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::routing::table::SharedRouteTable;

/// Application state injected into the wildcard handler.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the route registry.
pub struct HttpServer {
    router: Router,
    config: Arc<RouterConfig>,
}

impl HttpServer {
    /// Create a server dispatching against the given (swappable) table.
    pub fn new(config: Arc<RouterConfig>, table: Arc<SharedRouteTable>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(table, config.clone()));
        let state = AppState { dispatcher };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Wildcard handler: every request goes through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "dispatching request"
    );

    let cancel = CancellationToken::new();
    let request_token = cancel.child_token();
    // Cancelled on drop, which includes client disconnect.
    let _guard = cancel.drop_guard();

    state.dispatcher.handle(method, &path, request_token).await
}

async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
        _ = shutdown.recv() => {
            tracing::info!("shutdown triggered");
        }
    }
}
