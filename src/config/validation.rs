//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every declared route template and filter spec
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::routing::{PathSpec, PathTemplate};

/// A single semantic problem, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than 0"));
    }
    check_status(&mut errors, "dispatch.blocked_status", config.dispatch.blocked_status);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{}]", i);
        match route.path.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::new(format!("{}.path", field), "missing path"));
            }
            Some(path) => {
                if let Err(e) = PathTemplate::compile(path) {
                    errors.push(ValidationError::new(format!("{}.path", field), e.to_string()));
                }
            }
        }
        check_status(&mut errors, &format!("{}.response.status", field), route.response.status);
    }

    for (i, filter) in config.filters.iter().enumerate() {
        let field = format!("filters[{}]", i);
        match filter.path.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::new(format!("{}.path", field), "missing path"));
            }
            Some(spec) => {
                if let Err(e) = PathSpec::parse(spec) {
                    errors.push(ValidationError::new(format!("{}.path", field), e.to_string()));
                }
            }
        }
        check_status(&mut errors, &format!("{}.status", field), filter.status);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_status(errors: &mut Vec<ValidationError>, field: &str, status: u16) {
    if !(100..=599).contains(&status) {
        errors.push(ValidationError::new(field, format!("{} is not a valid status code", status)));
    }
}
