//! Routes and filters declared in the config file.
//!
//! # Responsibilities
//! - Turn `[[routes]]` entries into fixed-response handlers
//! - Turn `[[filters]]` entries into allow/block/respond filters
//! - Build a ready `WebApp` from an `AppConfig`

use std::sync::Arc;

use crate::config::{AppConfig, FilterAction, FilterConfig, ResponseConfig};
use crate::dispatch::app::WebApp;
use crate::dispatch::context::RequestContext;
use crate::dispatch::handler::{Handler, HandlerResult};
use crate::error::ConfigurationError;
use crate::http::response::WebResponse;
use crate::routing::RouteSpec;

/// Answers every request with the same configured response.
///
/// `{name}` in the body is replaced with the captured path variable of that name.
#[derive(Debug, Clone)]
pub struct StaticResponder {
    response: ResponseConfig,
}

impl StaticResponder {
    pub fn new(response: ResponseConfig) -> Self {
        Self { response }
    }

    /// Single left-to-right pass; substituted values are never rescanned.
    fn render_body(&self, ctx: &RequestContext) -> Option<String> {
        let template = self.response.body.as_deref()?;
        let params = ctx.path_params();
        let mut body = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            body.push_str(&rest[..open]);
            let tail = &rest[open..];
            match tail.find('}') {
                Some(close) => {
                    let token = &tail[..=close];
                    match params.get(&tail[1..close]) {
                        Some(value) => body.push_str(value),
                        None => body.push_str(token),
                    }
                    rest = &tail[close + 1..];
                }
                None => {
                    body.push_str(tail);
                    rest = "";
                }
            }
        }
        body.push_str(rest);
        Some(body)
    }
}

impl Handler for StaticResponder {
    fn invoke(&self, ctx: &mut RequestContext) -> HandlerResult {
        let mut response = WebResponse::new(self.response.status);

        if let Some(body) = self.render_body(ctx) {
            response = response.text(body);
        }
        if let Some(content_type) = &self.response.content_type {
            response = response.content_type(content_type.clone());
        }
        for (name, value) in &self.response.headers {
            response = response.header(name.clone(), value.clone());
        }
        if let Some(location) = &self.response.redirect {
            response = response.redirect(location.clone());
        }

        HandlerResult::Response(response)
    }
}

/// A filter whose verdict is fixed by configuration.
#[derive(Debug, Clone)]
pub struct StaticFilter {
    action: FilterAction,
    status: u16,
    body: Option<String>,
}

impl StaticFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            action: config.action,
            status: config.status,
            body: config.body.clone(),
        }
    }
}

impl Handler for StaticFilter {
    fn invoke(&self, _ctx: &mut RequestContext) -> HandlerResult {
        match self.action {
            FilterAction::Allow => HandlerResult::proceed(),
            FilterAction::Block => HandlerResult::block(),
            FilterAction::Respond => {
                let response = WebResponse::new(self.status);
                HandlerResult::Response(match &self.body {
                    Some(body) => response.text(body.clone()),
                    None => response,
                })
            }
        }
    }
}

impl WebApp {
    /// Build an app with every route and filter the config declares.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        let app = WebApp::new(config.dispatch.clone());
        app.register_config(config)?;
        Ok(app)
    }

    /// Register the config-declared routes and filters on an existing app.
    pub fn register_config(&self, config: &AppConfig) -> Result<(), ConfigurationError> {
        for route in &config.routes {
            let spec = RouteSpec {
                path: route.path.clone(),
                methods: route.methods.clone(),
                name: route.name.clone(),
            };
            self.add_route(spec, Arc::new(StaticResponder::new(route.response.clone())))?;
        }

        for filter in &config.filters {
            self.add_filter(filter.path.as_deref(), Arc::new(StaticFilter::new(filter)))?;
        }

        tracing::info!(
            routes = config.routes.len(),
            filters = config.filters.len(),
            "Registered configured routes and filters"
        );
        Ok(())
    }
}
