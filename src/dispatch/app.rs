//! The application: registries, collaborators and the dispatch state machine.
//!
//! # Responsibilities
//! - Accept route and filter registrations at any time
//! - Hold the error, not-found, context and shutdown collaborators
//! - Drive one request through filters, route resolution and the handler
//! - Guarantee every dispatch ends in exactly one `Outcome`
//!
//! # Design Decisions
//! - Routes and filters are registered through `&self`; collaborators are set
//!   while the app is still owned, before it is shared
//! - The route is resolved once, before filters run, so one context serves the whole request
//! - Handler errors never escape `dispatch`; panics are contained too while `dispatch.catch_panics` is set
//! - Fallback 500s carry an empty body; the error detail only goes to the log
//! - Dispatch is synchronous; the HTTP layer runs it on a blocking thread

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::DispatchConfig;
use crate::dispatch::context::RequestContext;
use crate::dispatch::handler::{guarded, ContextHook, ErrorHandler, Handler, HandlerResult, ShutdownHook};
use crate::dispatch::outcome::{DispatchState, Outcome};
use crate::error::{ConfigurationError, HandlerError};
use crate::filter::{ChainResult, Filter, FilterChain};
use crate::http::response::WebResponse;
use crate::http::status::Status;
use crate::observability::metrics;
use crate::routing::{Route, RouteRegistry, RouteSpec};

/// A routing application.
pub struct WebApp {
    settings: Arc<DispatchConfig>,
    routes: RouteRegistry,
    filters: FilterChain,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    not_found_handler: Option<Arc<dyn Handler>>,
    context_handler: Option<Arc<dyn ContextHook>>,
    shutdown_handler: Option<Arc<dyn ShutdownHook>>,
}

macro_rules! method_shortcut {
    ($(#[$doc:meta] $name:ident => $method:literal),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name<F>(&self, path: &str, handler: F) -> Result<Arc<Route>, ConfigurationError>
            where
                F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
            {
                self.route(RouteSpec::new(path).method($method), handler)
            }
        )*
    };
}

impl WebApp {
    pub fn new(settings: DispatchConfig) -> Self {
        Self {
            settings: Arc::new(settings),
            routes: RouteRegistry::new(),
            filters: FilterChain::new(),
            error_handler: None,
            not_found_handler: None,
            context_handler: None,
            shutdown_handler: None,
        }
    }

    pub fn settings(&self) -> &DispatchConfig {
        &self.settings
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    // Collaborators

    /// Handler that turns route and filter errors into responses.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext, &HandlerError) -> HandlerResult + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Handler for requests that match no route.
    pub fn not_found_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.not_found_handler = Some(Arc::new(handler));
        self
    }

    /// Hook run on every new context before the filters.
    pub fn context_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.context_handler = Some(Arc::new(hook));
        self
    }

    /// Hook run once when the server stops.
    pub fn shutdown_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shutdown_handler = Some(Arc::new(hook));
        self
    }

    // Registration

    /// Register a route from its spec.
    pub fn route<F>(&self, spec: RouteSpec, handler: F) -> Result<Arc<Route>, ConfigurationError>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_route(spec, Arc::new(handler))
    }

    /// Register a route with an already shared handler.
    pub fn add_route(&self, spec: RouteSpec, handler: Arc<dyn Handler>) -> Result<Arc<Route>, ConfigurationError> {
        let route = self.routes.add(Route::new(spec, handler)?);
        metrics::set_routes_registered(self.routes.len());
        Ok(route)
    }

    method_shortcut! {
        /// Register a `GET` route.
        get => "GET",
        /// Register a `POST` route.
        post => "POST",
        /// Register a `PUT` route.
        put => "PUT",
        /// Register a `DELETE` route.
        delete => "DELETE",
        /// Register a `HEAD` route.
        head => "HEAD",
        /// Register an `OPTIONS` route.
        options => "OPTIONS",
        /// Register a `TRACE` route.
        trace => "TRACE",
    }

    /// Register a filter for the paths matching `spec`.
    pub fn filter<F>(&self, spec: &str, handler: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_filter(Some(spec), Arc::new(handler))
    }

    /// Register a filter with an already shared handler; `None` is rejected.
    pub fn add_filter(&self, spec: Option<&str>, handler: Arc<dyn Handler>) -> Result<(), ConfigurationError> {
        self.filters.add(Filter::new(spec, handler)?);
        metrics::set_filters_registered(self.filters.len());
        Ok(())
    }

    /// First route accepting `method` and `path`.
    pub fn resolve(&self, method: &str, path: &str) -> Option<Arc<Route>> {
        self.routes.resolve(method, path)
    }

    // Dispatch

    /// Dispatch a request that carries no transport object.
    pub fn dispatch(&self, method: &str, path: &str) -> Outcome {
        self.run(method, path, None)
    }

    /// Dispatch a request, handing `raw` to handlers through the context.
    pub fn dispatch_raw(&self, method: &str, path: &str, raw: Box<dyn Any + Send>) -> Outcome {
        self.run(method, path, Some(raw))
    }

    fn run(&self, method: &str, path: &str, raw: Option<Box<dyn Any + Send>>) -> Outcome {
        let start = Instant::now();
        tracing::trace!(method = %method, path = %path, state = %DispatchState::Idle, "Dispatch started");

        // 1. Resolve Route
        let route = self.routes.resolve(method, path);
        let params = route.as_ref().map(|r| r.path_params(path)).unwrap_or_default();
        let label = route.as_ref().map(|r| r.label().to_string());

        // 2. Build Context
        let mut ctx = RequestContext::for_request(
            method.to_string(),
            path.to_string(),
            label,
            params,
            raw,
            self.settings.clone(),
        );
        self.init_context(&mut ctx);

        // 3. Filters
        tracing::trace!(request_id = %ctx.request_id(), state = %DispatchState::FilterEvaluating, "Running filters");
        let chain = self
            .filters
            .run(&mut ctx, self.settings.catch_panics, |ctx, error| self.handle_error(ctx, error));

        let outcome = match chain {
            ChainResult::ShortCircuit(response) => Outcome::ShortCircuited(response),
            ChainResult::Continue => match route {
                // 4a. No Route
                None => Outcome::NotFound(self.handle_not_found(&mut ctx)),
                // 4b. Route Handler
                Some(route) => self.execute(&route, &mut ctx),
            },
        };

        let status = outcome
            .status()
            .unwrap_or_else(|| Status::new(self.settings.blocked_status));
        metrics::record_dispatch(method, outcome.state(), status.code(), start.elapsed());
        tracing::trace!(
            request_id = %ctx.request_id(),
            state = %outcome.state(),
            status = status.code(),
            "Dispatch finished"
        );

        outcome
    }

    fn init_context(&self, ctx: &mut RequestContext) {
        let Some(hook) = &self.context_handler else {
            return;
        };
        let result = guarded(self.settings.catch_panics, || {
            hook.init(ctx);
            HandlerResult::proceed()
        });
        if let HandlerResult::Error(error) = result {
            tracing::error!(request_id = %ctx.request_id(), error = %error, "Context hook failed");
        }
    }

    fn execute(&self, route: &Route, ctx: &mut RequestContext) -> Outcome {
        tracing::trace!(request_id = %ctx.request_id(), route = %route.label(), state = %DispatchState::RouteResolved, "Route resolved");
        tracing::trace!(request_id = %ctx.request_id(), state = %DispatchState::HandlerExecuting, "Invoking handler");

        let result = guarded(self.settings.catch_panics, || route.handler().invoke(ctx));

        match result {
            HandlerResult::Response(response) => Outcome::Ready(response),
            HandlerResult::Error(error) => {
                tracing::warn!(request_id = %ctx.request_id(), route = %route.label(), error = %error, "Handler failed");
                Outcome::ErrorDelegated(self.handle_error(ctx, &error))
            }
            other => {
                let error = HandlerError::UnexpectedResult { kind: other.kind() };
                tracing::warn!(request_id = %ctx.request_id(), route = %route.label(), error = %error, "Handler returned no response");
                Outcome::ErrorDelegated(self.handle_error(ctx, &error))
            }
        }
    }

    /// Turn an error into a response through the bound error handler.
    ///
    /// Without a handler, or when the handler fails, the answer is an empty 500.
    pub fn handle_error(&self, ctx: &mut RequestContext, error: &HandlerError) -> WebResponse {
        let Some(handler) = &self.error_handler else {
            tracing::error!(request_id = %ctx.request_id(), error = %error, "No error handler bound");
            return internal_error();
        };

        match guarded(self.settings.catch_panics, || handler.handle(ctx, error)) {
            HandlerResult::Response(response) => response,
            HandlerResult::Error(nested) => {
                tracing::error!(request_id = %ctx.request_id(), error = %nested, "Error handler failed");
                internal_error()
            }
            other => {
                tracing::error!(request_id = %ctx.request_id(), result = other.kind(), error = %error, "Error handler returned no response");
                internal_error()
            }
        }
    }

    /// Answer a request no route matched.
    pub fn handle_not_found(&self, ctx: &mut RequestContext) -> WebResponse {
        tracing::debug!(request_id = %ctx.request_id(), method = %ctx.method(), path = %ctx.path(), "No route matched");

        let Some(handler) = &self.not_found_handler else {
            return WebResponse::new(Status::NOT_FOUND).html(self.settings.not_found_body.clone());
        };

        match guarded(self.settings.catch_panics, || handler.invoke(ctx)) {
            HandlerResult::Response(response) => response,
            HandlerResult::Error(error) => {
                tracing::error!(request_id = %ctx.request_id(), error = %error, "Not-found handler failed");
                internal_error()
            }
            other => {
                tracing::error!(request_id = %ctx.request_id(), result = other.kind(), "Not-found handler returned no response");
                internal_error()
            }
        }
    }

    /// Run the shutdown hook, if one is bound. A panicking hook is logged.
    pub fn run_shutdown_hooks(&self) {
        let Some(hook) = &self.shutdown_handler else {
            return;
        };
        tracing::info!(app = %self.settings.app_name, "Running shutdown hook");
        let result = guarded(true, || {
            hook.on_shutdown();
            HandlerResult::proceed()
        });
        if let HandlerResult::Error(error) = result {
            tracing::error!(error = %error, "Shutdown hook failed");
        }
    }
}

fn internal_error() -> WebResponse {
    WebResponse::new(Status::INTERNAL_SERVER_ERROR)
}

impl Default for WebApp {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl fmt::Debug for WebApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebApp")
            .field("app_name", &self.settings.app_name)
            .field("routes", &self.routes.len())
            .field("filters", &self.filters.len())
            .field("error_handler", &self.error_handler.is_some())
            .field("not_found_handler", &self.not_found_handler.is_some())
            .finish_non_exhaustive()
    }
}
