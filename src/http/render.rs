//! Outcome → HTTP response.
//!
//! # Responsibilities
//! - Apply status, headers, cookies, content type and redirect
//! - Materialise the body (text, JSON, bytes, files from disk)
//! - Answer a response-less short-circuit with the configured blocked status
//!
//! # Design Decisions
//! - Invalid header names/values are logged and skipped, never fatal
//! - Redirects keep an explicit 3xx status, otherwise become 302
//! - Template bodies have no renderer and are answered with 500

use std::path::{Path, PathBuf};

use axum::{
    body::Body as AxumBody,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use crate::config::DispatchConfig;
use crate::dispatch::outcome::Outcome;
use crate::http::response::{Body, WebResponse};

/// Render a dispatch outcome.
pub async fn render(outcome: Outcome, settings: &DispatchConfig) -> Response {
    match outcome.into_response() {
        Some(response) => render_response(response, settings).await,
        None => {
            let status = StatusCode::from_u16(settings.blocked_status).unwrap_or(StatusCode::OK);
            plain(status, AxumBody::empty())
        }
    }
}

/// Render a single handler response.
pub async fn render_response(response: WebResponse, settings: &DispatchConfig) -> Response {
    let mut status = StatusCode::from_u16(response.status().code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = HeaderMap::new();

    // 1. Explicit Headers
    for (name, value) in response.headers().iter() {
        append(&mut headers, name, value);
    }

    // 2. Cookies
    for cookie in response.cookies() {
        append(&mut headers, header::SET_COOKIE.as_str(), &cookie.header_value());
    }

    // 3. Redirect
    if let Some(location) = response.redirect_target() {
        append(&mut headers, header::LOCATION.as_str(), location);
        if !status.is_redirection() {
            status = StatusCode::FOUND;
        }
    }

    // 4. Body
    let mut content_type = response.content_type_value().map(str::to_string);
    let body = match response.body() {
        Body::Empty => AxumBody::empty(),
        Body::Text(text) => AxumBody::from(text.clone()),
        Body::Bytes(bytes) => AxumBody::from(bytes.clone()),
        Body::Json(value) => match serde_json::to_vec(value) {
            Ok(bytes) => AxumBody::from(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise JSON body");
                return plain(StatusCode::INTERNAL_SERVER_ERROR, AxumBody::empty());
            }
        },
        Body::File(path) => {
            let resolved = resolve(&settings.resource_base, path);
            match tokio::fs::read(&resolved).await {
                Ok(bytes) => {
                    if let Some(name) = resolved.file_name().and_then(|n| n.to_str()) {
                        append(
                            &mut headers,
                            header::CONTENT_DISPOSITION.as_str(),
                            &format!("attachment; filename=\"{}\"", name),
                        );
                    }
                    content_type.get_or_insert_with(|| "application/octet-stream".to_string());
                    AxumBody::from(bytes)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %resolved.display(), "File body not found");
                    return plain(StatusCode::NOT_FOUND, AxumBody::empty());
                }
                Err(e) => {
                    tracing::error!(path = %resolved.display(), error = %e, "Failed to read file body");
                    return plain(StatusCode::INTERNAL_SERVER_ERROR, AxumBody::empty());
                }
            }
        }
        Body::Template { path, .. } => {
            tracing::error!(template = %path, "No template renderer is configured");
            return plain(StatusCode::INTERNAL_SERVER_ERROR, AxumBody::empty());
        }
    };

    // 5. Content Type
    if let Some(content_type) = content_type {
        let value = if needs_charset(&content_type) {
            format!("{}; charset={}", content_type, response.encoding())
        } else {
            content_type
        };
        append(&mut headers, header::CONTENT_TYPE.as_str(), &value);
    }

    let mut rendered = plain(status, body);
    rendered.headers_mut().extend(headers);
    rendered
}

fn plain(status: StatusCode, body: AxumBody) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn append(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => {
            headers.append(name, value);
        }
        _ => tracing::warn!(header = %name, "Skipping invalid response header"),
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn needs_charset(content_type: &str) -> bool {
    !content_type.contains("charset")
        && (content_type.starts_with("text/") || content_type == "application/json")
}
