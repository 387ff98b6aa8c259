//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use script_router::config::AppConfig;
use script_router::dispatch::{HandlerResult, RequestContext};
use script_router::http::HttpServer;
use script_router::lifecycle::Shutdown;
use script_router::{WebApp, WebResponse};

/// Handler answering 200 with a fixed text body.
#[allow(dead_code)]
pub fn text(body: &'static str) -> impl Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static {
    move |_| HandlerResult::Response(WebResponse::ok().text(body))
}

/// Serve `app` on an ephemeral loopback port.
///
/// Returns the bound address, the shutdown trigger and the server task.
#[allow(dead_code)]
pub async fn start_server(
    app: WebApp,
    config: AppConfig,
) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(app), &config);
    let wait = shutdown.wait();

    let handle = tokio::spawn(async move {
        let _ = server.run(listener, wait).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown, handle)
}
