//! Path templates with named variables.
//!
//! # Responsibilities
//! - Compile a pattern such as `/users/{id}/posts` into literal and variable segments
//! - Decide whether a request path matches the template
//! - Extract the variables captured by a match
//!
//! # Design Decisions
//! - Fixed arity: a path matches only when its segment count equals the template's
//! - Literal segments compare byte-exact (case-sensitive)
//! - No wildcards, regexes or optional segments
//! - Compiled once, never mutated; identical patterns still produce distinct templates

use std::collections::HashMap;
use std::fmt;

use crate::error::TemplateError;
use crate::routing::matcher::Matcher;

/// Variables captured from a matched path, keyed by variable name.
pub type PathParams = HashMap<String, String>;

/// A single `/`-delimited piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// A compiled route pattern.
#[derive(Clone)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a pattern string.
    ///
    /// Fails on an empty pattern, on a `{` that is never closed, and on braces
    /// that do not wrap an entire segment.
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        if pattern.is_empty() {
            return Err(TemplateError::Empty);
        }

        let segments = pattern
            .split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the variables in declaration order (duplicates included).
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match and extract in one pass.
    ///
    /// Returns `None` when the path does not match. When a variable name is
    /// repeated, the value captured by its last occurrence wins.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::new();
        let mut candidate = path.split('/');

        for segment in &self.segments {
            let part = candidate.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Variable(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        // Extra trailing segments mean a different arity.
        if candidate.next().is_some() {
            return None;
        }

        Some(params)
    }

    /// Extract variables from a path; empty when the path does not match.
    pub fn extract(&self, path: &str) -> PathParams {
        self.match_path(path).unwrap_or_default()
    }
}

impl Matcher for PathTemplate {
    fn matches(&self, path: &str) -> bool {
        let mut candidate = path.split('/');
        let aligned = self.segments.iter().all(|segment| match candidate.next() {
            Some(part) => match segment {
                Segment::Literal(literal) => literal == part,
                Segment::Variable(_) => true,
            },
            None => false,
        });
        aligned && candidate.next().is_none()
    }
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathTemplate").field(&self.pattern).finish()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn parse_segment(raw: &str) -> Result<Segment, TemplateError> {
    if let Some(rest) = raw.strip_prefix('{') {
        let name = rest.strip_suffix('}').ok_or_else(|| TemplateError::Unterminated {
            segment: raw.to_string(),
        })?;
        if name.is_empty() || name.contains(['{', '}']) {
            return Err(TemplateError::Malformed {
                segment: raw.to_string(),
            });
        }
        return Ok(Segment::Variable(name.to_string()));
    }

    if raw.contains(['{', '}']) {
        return Err(TemplateError::Malformed {
            segment: raw.to_string(),
        });
    }

    Ok(Segment::Literal(raw.to_string()))
}
