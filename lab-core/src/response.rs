//! Response helpers for handlers
//!
//! Handlers own their responses completely; these helpers only save typing.
//! Nothing here adds security headers or cookie flags on its own.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use lab_common::SetCookie;
use tracing::warn;

/// Body of the response for a key no route matches
pub const NOT_FOUND_BODY: &str = "Not Found";

pub const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// The fixed response for an unmatched dispatch key
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

/// 200 with an HTML content type
pub fn html(body: impl Into<String>) -> Response {
    with_status(StatusCode::OK, body)
}

/// HTML body with an explicit status
pub fn with_status(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
        Body::from(body.into()),
    )
        .into_response()
}

/// Empty 200, used by endpoints that only need to observe the request
pub fn empty() -> Response {
    StatusCode::OK.into_response()
}

/// Redirect with a bare `Location` header
pub fn redirect(status: StatusCode, location: &str) -> Response {
    let mut response = status.into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => warn!("Dropping invalid Location {}: {}", location, e),
    }
    response
}

/// Append one `Set-Cookie` header per cookie, rendered verbatim
pub fn with_cookies(mut response: Response, cookies: &[SetCookie]) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name, "Dropping unencodable cookie: {}", e),
        }
    }
    response
}
