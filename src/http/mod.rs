//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body buffering)
//!     → request.rs (HttpRequest handed to handlers as the raw request)
//!     → [WebApp::dispatch]
//!     → response.rs (WebResponse built by handlers)
//!     → render.rs (Outcome → HTTP response)
//!     → Send to client
//! ```

pub mod render;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use request::{BasicAuthCredentials, HttpRequest, X_REQUEST_ID};
pub use response::{Body, Cookie, Headers, WebResponse};
pub use server::HttpServer;
pub use status::Status;
