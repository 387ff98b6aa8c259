//! Raw request handle passed through to handlers.
//!
//! # Responsibilities
//! - Carry what the transport already parsed: method, URI, headers, body
//! - Offer read helpers for query parameters, headers, Basic credentials and JSON bodies
//!
//! # Design Decisions
//! - The dispatch core never looks inside; it travels as an opaque value on the context
//! - Query strings are decoded lazily on each call; requests are short-lived

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::response::Headers;

/// Header carrying the correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Credentials from an `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: String,
}

impl BasicAuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse a header value such as `Basic YnJldHQ6ZmF2cmU=`.
    ///
    /// Both parts are trimmed. Anything undecodable, non-UTF-8 or without a `:` yields `None`.
    pub fn from_header(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        if !parts.next()?.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(parts.next()?).ok()?;
        let credentials = String::from_utf8(decoded).ok()?;
        let (username, password) = credentials.split_once(':')?;
        Some(Self::new(username.trim(), password.trim()))
    }
}

/// A transport request as seen by handlers.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    method: String,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Build from a method and a request target (`/path?query`).
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method: method.into(),
            path,
            query,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<String> {
        self.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Every value of a query parameter, in order.
    pub fn params(&self, name: &str) -> Vec<String> {
        self.query_pairs()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// Distinct parameter names, in first-seen order.
    pub fn param_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (k, _) in self.query_pairs() {
            if !names.contains(&k) {
                names.push(k);
            }
        }
        names
    }

    /// Basic credentials from the `Authorization` header, if present and well formed.
    pub fn basic_auth(&self) -> Option<BasicAuthCredentials> {
        self.header("authorization").and_then(BasicAuthCredentials::from_header)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    fn query_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or("").as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
    }
}
