//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router that sends every method and path to the dispatcher
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener
//! - Convert transport requests into `HttpRequest` and dispatch outcomes back into responses
//! - Run the app's shutdown hook once serving stops
//!
//! # Design Decisions
//! - Dispatch is synchronous and may block, so it runs on Tokio's blocking pool
//! - The body is buffered up to `limits.max_body_size` before dispatch

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::WebApp;
use crate::http::render::render;
use crate::http::request::HttpRequest;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<WebApp>,
    pub max_body_size: usize,
}

/// HTTP front end for a `WebApp`.
pub struct HttpServer {
    router: Router,
    app: Arc<WebApp>,
}

impl HttpServer {
    /// Create a new HTTP server for `app`, configured from `config`.
    pub fn new(app: Arc<WebApp>, config: &AppConfig) -> Self {
        let state = AppState {
            app: app.clone(),
            max_body_size: config.limits.max_body_size,
        };
        let router = Self::build_router(config, state);
        Self { router, app }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn app(&self) -> &Arc<WebApp> {
        &self.app
    }

    /// Run the server until `shutdown` resolves, then run the app's shutdown hook.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app = %self.app.settings().app_name,
            routes = self.app.routes().len(),
            filters = self.app.filters().len(),
            "HTTP server starting"
        );

        let served = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await;

        self.app.run_shutdown_hooks();
        tracing::info!("HTTP server stopped");
        served
    }
}

/// Sends every request through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    // 1. Buffer Body
    let bytes = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    // 2. Build Raw Request
    let target = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let mut raw = HttpRequest::new(parts.method.as_str(), target).with_body(bytes.to_vec());
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            raw = raw.with_header(name.as_str(), value);
        }
    }

    let method = parts.method.as_str().to_string();
    let path = raw.path().to_string();

    // 3. Dispatch
    let app = state.app.clone();
    let outcome = match tokio::task::spawn_blocking(move || app.dispatch_raw(&method, &path, Box::new(raw))).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(path = %parts.uri.path(), error = %e, "Dispatch task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    // 4. Render
    render(outcome, state.app.settings()).await
}
