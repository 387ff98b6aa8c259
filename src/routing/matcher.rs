//! Path matching primitives.
//!
//! # Responsibilities
//! - Define the `Matcher` trait shared by route templates and filter specs
//! - Match filter path specs (exact, prefix and extension forms)
//!
//! # Design Decisions
//! - Filter specs follow servlet url-pattern rules, independent of template variables
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::error::ConfigurationError;

/// Trait for matching request paths against a condition.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the path satisfies this condition.
    fn matches(&self, path: &str) -> bool;
}

/// A filter path spec.
///
/// Supported forms:
/// - `/*` (or `*`) matches every path
/// - `/api/*` matches `/api` and anything below it
/// - `*.json` matches any path ending in `.json`
/// - anything else is an exact match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    Any,
    Prefix(String),
    Extension(String),
    Exact(String),
}

impl PathSpec {
    /// Parse a spec string.
    pub fn parse(spec: &str) -> Result<Self, ConfigurationError> {
        if spec.is_empty() {
            return Err(ConfigurationError::MissingPath { kind: "filter" });
        }

        if spec == "/*" || spec == "*" {
            return Ok(PathSpec::Any);
        }

        if let Some(prefix) = spec.strip_suffix("/*") {
            if prefix.contains('*') {
                return Err(invalid(spec));
            }
            return Ok(PathSpec::Prefix(prefix.to_string()));
        }

        if let Some(ext) = spec.strip_prefix("*.") {
            if ext.is_empty() || ext.contains(['*', '/']) {
                return Err(invalid(spec));
            }
            return Ok(PathSpec::Extension(format!(".{}", ext)));
        }

        if spec.contains('*') {
            return Err(invalid(spec));
        }

        Ok(PathSpec::Exact(spec.to_string()))
    }
}

impl Matcher for PathSpec {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathSpec::Any => true,
            PathSpec::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
            PathSpec::Extension(ext) => path.ends_with(ext.as_str()),
            PathSpec::Exact(exact) => exact == path,
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::Any => f.write_str("/*"),
            PathSpec::Prefix(prefix) => write!(f, "{}/*", prefix),
            PathSpec::Extension(ext) => write!(f, "*{}", ext),
            PathSpec::Exact(exact) => f.write_str(exact),
        }
    }
}

fn invalid(spec: &str) -> ConfigurationError {
    ConfigurationError::InvalidPathSpec {
        spec: spec.to_string(),
    }
}
