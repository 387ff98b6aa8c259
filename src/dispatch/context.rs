//! Per-request context.
//!
//! # Responsibilities
//! - Carry the request identity (method, path, request id) through filters and handlers
//! - Expose captured path variables, read-only
//! - Hold a mutable key/value bag shared by every handler that sees the request
//! - Carry the opaque transport request
//!
//! # Design Decisions
//! - One context per physical request; filters, the route handler and the
//!   error/not-found handlers all receive the same `&mut RequestContext`
//! - Settings are shared as `Arc<DispatchConfig>`; the context never points back at the app

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::http::request::{BasicAuthCredentials, HttpRequest, X_REQUEST_ID};
use crate::routing::PathParams;

/// The state handlers see for one request.
pub struct RequestContext {
    method: String,
    path: String,
    request_id: String,
    route: Option<String>,
    path_params: PathParams,
    contents: HashMap<String, serde_json::Value>,
    raw: Option<Box<dyn Any + Send>>,
    settings: Arc<DispatchConfig>,
}

impl RequestContext {
    /// A context with default settings and no transport request.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::for_request(
            method.into(),
            path.into(),
            None,
            PathParams::new(),
            None,
            Arc::new(DispatchConfig::default()),
        )
    }

    pub(crate) fn for_request(
        method: String,
        path: String,
        route: Option<String>,
        path_params: PathParams,
        raw: Option<Box<dyn Any + Send>>,
        settings: Arc<DispatchConfig>,
    ) -> Self {
        let request_id = raw
            .as_ref()
            .and_then(|r| r.downcast_ref::<HttpRequest>())
            .and_then(|r| r.header(X_REQUEST_ID))
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            method,
            path,
            request_id,
            route,
            path_params,
            contents: HashMap::new(),
            raw,
            settings,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Correlation id: the inbound `x-request-id`, else a fresh UUID v4.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Label of the resolved route, if any.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.contents.get(key)
    }

    /// Store a value; later handlers on the same request see it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.contents.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.contents.remove(key)
    }

    pub fn contents(&self) -> &HashMap<String, serde_json::Value> {
        &self.contents
    }

    /// The transport request, downcast to its concrete type.
    pub fn raw<T: Any>(&self) -> Option<&T> {
        self.raw.as_ref().and_then(|r| r.downcast_ref::<T>())
    }

    /// The HTTP request, when dispatched by the HTTP server.
    pub fn request(&self) -> Option<&HttpRequest> {
        self.raw::<HttpRequest>()
    }

    /// Basic credentials sent with the HTTP request.
    pub fn basic_auth(&self) -> Option<BasicAuthCredentials> {
        self.request().and_then(HttpRequest::basic_auth)
    }

    pub fn settings(&self) -> &DispatchConfig {
        &self.settings
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("request_id", &self.request_id)
            .field("route", &self.route)
            .field("path_params", &self.path_params)
            .field("contents", &self.contents)
            .finish_non_exhaustive()
    }
}
