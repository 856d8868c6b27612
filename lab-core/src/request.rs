//! Request normalization
//!
//! Turns a raw request into a [`RequestContext`]: method, host, path, query
//! map and cookie map. Malformed input never fails; it normalizes to empty.
//! The body is left untouched until a handler explicitly asks for it.

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::LabError;
use crate::Result;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request};
use std::collections::HashMap;
use std::sync::Mutex;
use url::form_urlencoded;

/// Split a query string into key/value pairs. Duplicate keys: last one wins.
pub fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    match raw {
        Some(raw) => parse_form(raw.as_bytes()),
        None => HashMap::new(),
    }
}

/// Decode an `application/x-www-form-urlencoded` body. Last duplicate wins.
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Split a `Cookie` header on `"; "` into name/value pairs.
///
/// A segment without `=` maps to an empty value; empty names are skipped.
pub fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };

    for segment in header.split("; ") {
        let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
        let name = decode_component(name);
        if name.is_empty() {
            continue;
        }
        cookies.insert(name, decode_component(value));
    }
    cookies
}

/// Percent/plus decode a single component without splitting it further
fn decode_component(raw: &str) -> String {
    let escaped = raw.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}

/// Normalized view of one request, owned by the handler that serves it
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    host: Option<String>,
    path: String,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
    headers: HeaderMap,
    body: Mutex<Option<Body>>,
    body_limit: usize,
}

impl RequestContext {
    pub fn from_request(req: Request<Body>) -> Self {
        let (parts, body) = req.into_parts();

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));
        let cookies = parse_cookies(
            parts
                .headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok()),
        );

        Self {
            method: parts.method,
            host,
            path: parts.uri.path().to_string(),
            query: parse_query(parts.uri.query()),
            cookies,
            headers: parts.headers,
            body: Mutex::new(Some(body)),
            body_limit: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Value of the `Host` header, e.g. `localhost:3000`
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Read the whole body. This is the only suspension point a handler
    /// sees; partial data is never exposed. The body can be taken once,
    /// later calls return an empty buffer.
    pub async fn read_body(&self) -> Result<Bytes> {
        let taken = self
            .body
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(body) = taken else {
            return Ok(Bytes::new());
        };
        axum::body::to_bytes(body, self.body_limit)
            .await
            .map_err(|e| LabError::BodyRead(e.to_string()))
    }

    /// Read the whole body and decode it as a form
    pub async fn read_form(&self) -> Result<HashMap<String, String>> {
        let body = self.read_body().await?;
        Ok(parse_form(&body))
    }
}
