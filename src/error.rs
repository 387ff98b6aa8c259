//! Error taxonomy for the routing and dispatch core.
//!
//! # Responsibilities
//! - Registration-time failures (`ConfigurationError`, `TemplateError`)
//! - Request-time failures produced by handlers and filters (`HandlerError`)
//!
//! # Design Decisions
//! - Registration errors are fatal and returned to the caller before serving starts
//! - `HandlerError` is a value, never unwound past `WebApp::dispatch`
//! - A missing route is not an error type; it is the `NotFound` outcome

use thiserror::Error;

/// Failure to compile a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("path template is empty")]
    Empty,

    #[error("unterminated variable in segment `{segment}`")]
    Unterminated { segment: String },

    #[error("malformed segment `{segment}`: variables must span a whole segment as `{{name}}`")]
    Malformed { segment: String },
}

/// Failure to register a route or filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("the supplied {kind} does not specify a 'path'")]
    MissingPath { kind: &'static str },

    #[error("invalid route path: {0}")]
    InvalidTemplate(#[from] TemplateError),

    #[error("invalid filter path spec `{spec}`")]
    InvalidPathSpec { spec: String },
}

/// Error value produced while running a handler or filter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    /// The handler returned an explicit error value.
    #[error("{message}")]
    Script {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The handler panicked; the panic was contained at the dispatch boundary.
    #[error("handler panicked: {message}")]
    Panicked { message: String },

    /// A route handler returned something other than a response.
    #[error("route handler returned a {kind} instead of a response")]
    UnexpectedResult { kind: &'static str },
}

impl HandlerError {
    /// Shorthand for an explicit script error.
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
            details: None,
        }
    }

    /// Extract a readable message from a panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { message }
    }
}
