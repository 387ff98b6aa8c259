//! Ordered pre-handler interception.
//!
//! # Responsibilities
//! - Store filters in registration order
//! - Run every filter whose path spec matches, stopping at the first veto
//! - Turn each filter result into continue / short-circuit
//!
//! # Design Decisions
//! - Same copy-on-write storage as the route registry: append-only, lock-free reads
//! - Only `true` continues, as a `Boolean` or a JSON `Value`; any other non-response value blocks
//! - Filter errors go through the caller-supplied error path and end the chain

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::dispatch::context::RequestContext;
use crate::dispatch::handler::{guarded, Handler, HandlerResult};
use crate::error::{ConfigurationError, HandlerError};
use crate::http::response::WebResponse;
use crate::routing::matcher::{Matcher, PathSpec};

/// A path spec bound to a handler.
pub struct Filter {
    spec: PathSpec,
    handler: Arc<dyn Handler>,
}

impl Filter {
    /// Build a filter; fails when the spec is missing or malformed.
    pub fn new(spec: Option<&str>, handler: Arc<dyn Handler>) -> Result<Self, ConfigurationError> {
        let spec = spec.ok_or(ConfigurationError::MissingPath { kind: "filter" })?;
        Ok(Self {
            spec: PathSpec::parse(spec)?,
            handler,
        })
    }

    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.spec.matches(path)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Result of running the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainResult {
    /// Every matching filter allowed the request.
    Continue,
    /// A filter stopped the request, optionally with its own response.
    ShortCircuit(Option<WebResponse>),
}

/// Registration-ordered filter list.
pub struct FilterChain {
    filters: ArcSwap<Vec<Arc<Filter>>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a filter. Visible to requests that start after this returns.
    pub fn add(&self, filter: Filter) {
        let filter = Arc::new(filter);
        self.filters.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(filter.clone());
            next
        });
        tracing::debug!(spec = %filter.spec, "Filter registered");
    }

    pub fn len(&self) -> usize {
        self.filters.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the filters matching `ctx.path()` in registration order.
    ///
    /// `on_error` turns a filter error into the response sent instead.
    pub fn run<E>(&self, ctx: &mut RequestContext, catch_panics: bool, on_error: E) -> ChainResult
    where
        E: Fn(&mut RequestContext, &HandlerError) -> WebResponse,
    {
        let filters = self.filters.load_full();
        let path = ctx.path().to_string();

        for filter in filters.iter().filter(|f| f.applies_to(&path)) {
            let result = guarded(catch_panics, || filter.handler.invoke(ctx));

            match result {
                HandlerResult::Boolean(true) | HandlerResult::Value(serde_json::Value::Bool(true)) => continue,
                HandlerResult::Response(response) => {
                    tracing::info!(spec = %filter.spec, path = %path, status = %response.status(), "Filter answered request");
                    return ChainResult::ShortCircuit(Some(response));
                }
                HandlerResult::Error(error) => {
                    tracing::warn!(spec = %filter.spec, path = %path, error = %error, "Filter failed");
                    return ChainResult::ShortCircuit(Some(on_error(ctx, &error)));
                }
                other => {
                    tracing::info!(spec = %filter.spec, path = %path, result = other.kind(), "Filter blocked request");
                    return ChainResult::ShortCircuit(None);
                }
            }
        }

        ChainResult::Continue
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain").field("filters", &self.len()).finish()
    }
}
