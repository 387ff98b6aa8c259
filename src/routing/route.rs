//! Route definitions.
//!
//! # Responsibilities
//! - Bind a compiled template, an allowed method set and a handler
//! - Validate the registration record at construction
//!
//! # Design Decisions
//! - Methods are normalised to uppercase once, at construction
//! - An omitted or empty method list means `GET`
//! - Routes are immutable after construction and shared as `Arc<Route>`

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::handler::Handler;
use crate::error::ConfigurationError;
use crate::routing::matcher::Matcher;
use crate::routing::template::{PathParams, PathTemplate};

/// Registration record for a route, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSpec {
    /// Route pattern, e.g. `/users/{id}`. Required.
    pub path: Option<String>,
    /// Allowed request methods, any case. Empty means `GET`.
    pub methods: Vec<String>,
    /// Optional label used in logs and metrics.
    pub name: Option<String>,
}

impl RouteSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The uppercase set of methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet(BTreeSet<String>);

impl MethodSet {
    /// Normalise a method list; blank entries are ignored, an empty result becomes `{GET}`.
    pub fn from_list<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = methods
            .into_iter()
            .map(|m| m.as_ref().trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();

        if set.is_empty() {
            set.insert("GET".to_string());
        }

        Self(set)
    }

    /// Case-insensitive membership test.
    pub fn allows(&self, method: &str) -> bool {
        self.0.contains(&method.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().cloned().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

/// A route into the application.
pub struct Route {
    template: PathTemplate,
    methods: MethodSet,
    name: Option<String>,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Build a route from its registration record.
    ///
    /// Fails when no path was supplied or the path is not a valid template.
    pub fn new(spec: RouteSpec, handler: Arc<dyn Handler>) -> Result<Self, ConfigurationError> {
        let path = spec
            .path
            .filter(|p| !p.is_empty())
            .ok_or(ConfigurationError::MissingPath { kind: "route" })?;

        let template = PathTemplate::compile(&path)?;

        Ok(Self {
            template,
            methods: MethodSet::from_list(&spec.methods),
            name: spec.name,
            handler,
        })
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Label for logs: the configured name, else the pattern.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.template.pattern())
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// True when both the path and the method are accepted.
    pub fn accepts(&self, method: &str, path: &str) -> bool {
        self.template.matches(path) && self.methods.allows(method)
    }

    /// Variables captured from the supplied path (empty when it does not match).
    pub fn path_params(&self, path: &str) -> PathParams {
        self.template.extract(path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("template", &self.template)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
