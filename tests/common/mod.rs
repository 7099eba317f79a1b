//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use fsrouter::config::RouterConfig;
use fsrouter::http::HttpServer;
use fsrouter::lifecycle::Shutdown;
use fsrouter::routing::{RouteTable, SharedRouteTable};

/// Start a server on an ephemeral port. The returned `Shutdown` keeps the
/// server alive for the duration of the test.
pub async fn spawn_server(config: RouterConfig, table: RouteTable) -> (SocketAddr, Shutdown) {
    spawn_server_shared(Arc::new(config), Arc::new(SharedRouteTable::new(table))).await
}

/// Start a server against an externally-held table handle, so tests can
/// swap the table while the server is running.
#[allow(dead_code)]
pub async fn spawn_server_shared(
    config: Arc<RouterConfig>,
    table: Arc<SharedRouteTable>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, table);
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
