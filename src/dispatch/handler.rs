//! Handler abstractions.
//!
//! # Responsibilities
//! - Define the callable shapes the dispatcher invokes: route/filter handlers,
//!   the error handler, the context hook and the shutdown hook
//! - Define `HandlerResult`, the tagged value every handler returns
//! - Contain panics at the invocation boundary
//!
//! # Design Decisions
//! - Every trait has a blanket impl for matching closures, so plain closures register directly
//! - Handlers are `Send + Sync`; the dispatcher may call the same handler from many threads

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::dispatch::context::RequestContext;
use crate::error::HandlerError;
use crate::http::response::WebResponse;

/// What a handler hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// A finished response.
    Response(WebResponse),
    /// Filter verdict: `true` continues the chain, `false` blocks it.
    Boolean(bool),
    /// An error value, delegated to the error handler.
    Error(HandlerError),
    /// Any other value. As a filter verdict, JSON `true` continues and everything else blocks.
    Value(serde_json::Value),
}

impl HandlerResult {
    /// Short variant name, used in logs and `UnexpectedResult` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerResult::Response(_) => "response",
            HandlerResult::Boolean(_) => "boolean",
            HandlerResult::Error(_) => "error",
            HandlerResult::Value(_) => "value",
        }
    }

    /// Allow the filter chain to continue.
    pub fn proceed() -> Self {
        HandlerResult::Boolean(true)
    }

    /// Stop the filter chain without a response.
    pub fn block() -> Self {
        HandlerResult::Boolean(false)
    }

    /// Shorthand for `HandlerResult::Error(HandlerError::script(message))`.
    pub fn error(message: impl Into<String>) -> Self {
        HandlerResult::Error(HandlerError::script(message))
    }
}

impl From<WebResponse> for HandlerResult {
    fn from(response: WebResponse) -> Self {
        HandlerResult::Response(response)
    }
}

impl From<bool> for HandlerResult {
    fn from(verdict: bool) -> Self {
        HandlerResult::Boolean(verdict)
    }
}

impl From<HandlerError> for HandlerResult {
    fn from(error: HandlerError) -> Self {
        HandlerResult::Error(error)
    }
}

impl From<Result<WebResponse, HandlerError>> for HandlerResult {
    fn from(result: Result<WebResponse, HandlerError>) -> Self {
        match result {
            Ok(response) => HandlerResult::Response(response),
            Err(error) => HandlerResult::Error(error),
        }
    }
}

/// A route or filter handler.
pub trait Handler: Send + Sync {
    fn invoke(&self, ctx: &mut RequestContext) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync,
{
    fn invoke(&self, ctx: &mut RequestContext) -> HandlerResult {
        self(ctx)
    }
}

/// Turns a handler error into a response.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, ctx: &mut RequestContext, error: &HandlerError) -> HandlerResult;
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut RequestContext, &HandlerError) -> HandlerResult + Send + Sync,
{
    fn handle(&self, ctx: &mut RequestContext, error: &HandlerError) -> HandlerResult {
        self(ctx, error)
    }
}

/// Runs once on every new request context, before any filter.
pub trait ContextHook: Send + Sync {
    fn init(&self, ctx: &mut RequestContext);
}

impl<F> ContextHook for F
where
    F: Fn(&mut RequestContext) + Send + Sync,
{
    fn init(&self, ctx: &mut RequestContext) {
        self(ctx)
    }
}

/// Runs once when the server stops.
pub trait ShutdownHook: Send + Sync {
    fn on_shutdown(&self);
}

impl<F> ShutdownHook for F
where
    F: Fn() + Send + Sync,
{
    fn on_shutdown(&self) {
        self()
    }
}

/// Run `f`, turning a panic into `HandlerResult::Error` when `catch_panics` is set.
pub(crate) fn guarded<F>(catch_panics: bool, f: F) -> HandlerResult
where
    F: FnOnce() -> HandlerResult,
{
    if !catch_panics {
        return f();
    }
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => HandlerResult::Error(HandlerError::from_panic(payload)),
    }
}
