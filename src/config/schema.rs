//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Body served when no route matches and no not-found handler is bound.
pub const NOT_FOUND_PAGE: &str = "<html><body><h2>404 Not found</h2></body></html>";

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Settings handed to the dispatcher and visible to handlers.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Statically declared routes.
    pub routes: Vec<RouteConfig>,

    /// Statically declared filters, in evaluation order.
    pub filters: Vec<FilterConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8121").
    pub bind_address: String,

    /// Maximum requests handled concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8121".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 200 * 1024 * 1024, // 200MB
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Application name, reported in logs.
    pub app_name: String,

    /// Directory that relative file bodies are resolved against.
    pub resource_base: PathBuf,

    /// Status sent when a filter blocks a request without supplying a response.
    pub blocked_status: u16,

    /// Body of the built-in 404 page.
    pub not_found_body: String,

    /// Contain handler panics and answer them through the error handler.
    pub catch_panics: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            app_name: "script-router".to_string(),
            resource_base: PathBuf::from("."),
            blocked_status: 200,
            not_found_body: NOT_FOUND_PAGE.to_string(),
            catch_panics: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route declared in the config file, answered with a fixed response.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: Option<String>,

    /// Path template, e.g. "/users/{id}".
    pub path: Option<String>,

    /// Allowed methods; empty means GET.
    pub methods: Vec<String>,

    /// The response to send.
    pub response: ResponseConfig,
}

/// A fixed response.
///
/// `{name}` placeholders in `body` are replaced with captured path variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub status: u16,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub redirect: Option<String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: None,
            content_type: None,
            headers: BTreeMap::new(),
            redirect: None,
        }
    }
}

/// What a config-declared filter does with the requests it sees.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Let the request through.
    #[default]
    Allow,
    /// Stop the request without a response.
    Block,
    /// Stop the request and answer with `status`/`body`.
    Respond,
}

/// A filter declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Path spec: "/*", "/prefix/*", "*.ext" or an exact path.
    pub path: Option<String>,

    pub action: FilterAction,

    /// Status for `respond`.
    pub status: u16,

    /// Body for `respond`.
    pub body: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            path: None,
            action: FilterAction::Allow,
            status: 403,
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8121");
        assert_eq!(config.dispatch.blocked_status, 200);
        assert!(config.dispatch.catch_panics);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_minimal_toml() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [[routes]]
            path = "/hello/{name}"
            methods = ["get", "post"]
            response = { body = "hi {name}", content_type = "text/plain" }

            [[filters]]
            path = "/admin/*"
            action = "respond"
            status = 401
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].methods, vec!["get", "post"]);
        assert_eq!(config.routes[0].response.status, 200);
        assert_eq!(config.filters[0].action, FilterAction::Respond);
        assert_eq!(config.filters[0].status, 401);
    }
}
