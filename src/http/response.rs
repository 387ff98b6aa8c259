//! Response descriptors.
//!
//! # Responsibilities
//! - Describe what a handler wants sent back: status, headers, cookies, body
//! - Stay independent of the transport; `render.rs` turns a descriptor into bytes
//!
//! # Design Decisions
//! - Builder methods consume and return `self` for chaining
//! - Headers form a multimap that keeps insertion order
//! - Template and file bodies are references; resolving them is the renderer's job

use std::path::PathBuf;

use serde::Serialize;

use crate::http::status::Status;

/// Ordered header multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, keeping any existing values for the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// All values for a name, compared case-insensitively.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A cookie to set on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            max_age: None,
            http_only: false,
        }
    }

    /// A cookie that instructs the client to drop `name`.
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            max_age: Some(0),
            ..Self::new(name, "")
        }
    }

    /// `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// Response payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    /// A file to stream, resolved against the configured resource base.
    File(PathBuf),
    /// A template reference plus the values to render it with.
    Template {
        path: String,
        values: serde_json::Value,
    },
}

/// Everything a handler decided about the response.
#[derive(Debug, Clone, PartialEq)]
pub struct WebResponse {
    status: Status,
    headers: Headers,
    cookies: Vec<Cookie>,
    content_type: Option<String>,
    character_encoding: String,
    body: Body,
    redirect: Option<String>,
}

impl WebResponse {
    pub fn new(status: impl Into<Status>) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            cookies: Vec::new(),
            content_type: None,
            character_encoding: "UTF-8".to_string(),
            body: Body::Empty,
            redirect: None,
        }
    }

    /// An empty 200.
    pub fn ok() -> Self {
        Self::new(Status::OK)
    }

    /// 302 to `location`.
    pub fn see(location: impl Into<String>) -> Self {
        Self::new(Status::FOUND).redirect(location)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn content_type_value(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.character_encoding
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_cookie(Cookie::new(name, value))
    }

    pub fn add_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn remove_cookie(self, name: impl Into<String>) -> Self {
        self.add_cookie(Cookie::expired(name))
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn character_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.character_encoding = encoding.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content_type = Some("text/plain".to_string());
        self.body = Body::Text(text.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.content_type = Some("text/html".to_string());
        self.body = Body::Text(html.into());
        self
    }

    /// JSON body from any serialisable value.
    ///
    /// A value that cannot be represented as JSON becomes `null`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.content_type = Some("application/json".to_string());
        self.body = Body::Json(serde_json::to_value(value).unwrap_or(serde_json::Value::Null));
        self
    }

    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>, mime_type: Option<&str>) -> Self {
        if let Some(mime) = mime_type {
            self.content_type = Some(mime.to_string());
        }
        self.body = Body::Bytes(bytes.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>, mime_type: Option<&str>) -> Self {
        if let Some(mime) = mime_type {
            self.content_type = Some(mime.to_string());
        }
        self.body = Body::File(path.into());
        self
    }

    pub fn template<T: Serialize>(mut self, path: impl Into<String>, values: &T) -> Self {
        self.content_type = Some("text/html".to_string());
        self.body = Body::Template {
            path: path.into(),
            values: serde_json::to_value(values).unwrap_or(serde_json::Value::Null),
        };
        self
    }

    pub fn redirect(mut self, location: impl Into<String>) -> Self {
        self.redirect = Some(location.into());
        self
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}
