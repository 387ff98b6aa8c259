//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path, raw request)
//!     → app.rs (resolve route, build RequestContext, run context hook)
//!     → filter chain (may short-circuit)
//!     → route handler / not-found handler (handler.rs)
//!     → error handler on failure
//!     → outcome.rs (exactly one terminal Outcome)
//! ```
//!
//! # Design Decisions
//! - One `RequestContext` per request, shared by every handler that sees it
//! - Handler panics are contained and treated as handler errors
//! - Config-declared routes and filters (builtin.rs) use the same registration path as code

pub mod app;
pub mod builtin;
pub mod context;
pub mod handler;
pub mod outcome;

pub use app::WebApp;
pub use builtin::{StaticFilter, StaticResponder};
pub use context::RequestContext;
pub use handler::{ContextHook, ErrorHandler, Handler, HandlerResult, ShutdownHook};
pub use outcome::{DispatchState, Outcome};
