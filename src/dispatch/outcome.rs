//! Dispatch states and terminal outcomes.

use std::fmt;

use crate::http::response::WebResponse;
use crate::http::status::Status;

/// Where a request is in the dispatch state machine.
///
/// ```text
/// Idle → FilterEvaluating → ShortCircuited
///                         → RouteResolved → HandlerExecuting → ResponseReady
///                                                            → ErrorDelegated
///                         → NotFound
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    FilterEvaluating,
    ShortCircuited,
    RouteResolved,
    HandlerExecuting,
    ResponseReady,
    ErrorDelegated,
    NotFound,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Idle => "idle",
            DispatchState::FilterEvaluating => "filter_evaluating",
            DispatchState::ShortCircuited => "short_circuited",
            DispatchState::RouteResolved => "route_resolved",
            DispatchState::HandlerExecuting => "handler_executing",
            DispatchState::ResponseReady => "response_ready",
            DispatchState::ErrorDelegated => "error_delegated",
            DispatchState::NotFound => "not_found",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::ShortCircuited
                | DispatchState::ResponseReady
                | DispatchState::ErrorDelegated
                | DispatchState::NotFound
        )
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dispatch ended. Every request ends in exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The route handler produced a response.
    Ready(WebResponse),
    /// A filter stopped the request, with or without its own response.
    ShortCircuited(Option<WebResponse>),
    /// A handler failed; the response came from the error path.
    ErrorDelegated(WebResponse),
    /// No route matched; the response came from the not-found path.
    NotFound(WebResponse),
}

impl Outcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> DispatchState {
        match self {
            Outcome::Ready(_) => DispatchState::ResponseReady,
            Outcome::ShortCircuited(_) => DispatchState::ShortCircuited,
            Outcome::ErrorDelegated(_) => DispatchState::ErrorDelegated,
            Outcome::NotFound(_) => DispatchState::NotFound,
        }
    }

    pub fn response(&self) -> Option<&WebResponse> {
        match self {
            Outcome::Ready(r) | Outcome::ErrorDelegated(r) | Outcome::NotFound(r) => Some(r),
            Outcome::ShortCircuited(r) => r.as_ref(),
        }
    }

    pub fn into_response(self) -> Option<WebResponse> {
        match self {
            Outcome::Ready(r) | Outcome::ErrorDelegated(r) | Outcome::NotFound(r) => Some(r),
            Outcome::ShortCircuited(r) => r,
        }
    }

    /// Status of the carried response, if there is one.
    pub fn status(&self) -> Option<Status> {
        self.response().map(WebResponse::status)
    }
}
