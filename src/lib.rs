//! Script Router Library
//!
//! Request routing and dispatch for script-style web handlers: path
//! templates with `{variable}` segments, an ordered filter chain, and a
//! dispatcher that always ends a request in exactly one outcome.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use dispatch::{HandlerResult, Outcome, RequestContext, WebApp};
pub use error::{ConfigurationError, HandlerError, TemplateError};
pub use http::{HttpServer, WebResponse};
pub use lifecycle::Shutdown;
pub use routing::RouteSpec;
