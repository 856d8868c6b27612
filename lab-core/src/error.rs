//! Error types for harness operations

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the harness
#[derive(Debug, Error)]
pub enum LabError {
    /// Transport failure or size overrun while reading a request body
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Route already registered for key: {key}")]
    DuplicateRoute { key: String },

    #[error("Failed to bind {origin} listener on {addr}: {source}")]
    Bind {
        origin: String,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Logging error: {0}")]
    Logging(String),

    /// Anything a scenario handler fails with that is not a body read
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabError {
    /// Status code used when this error ends a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            LabError::BodyRead(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors never leak details to the client. A failed body read abandons the
/// response with an empty 400; everything else is a generic 500.
impl IntoResponse for LabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match status {
            StatusCode::BAD_REQUEST => Body::empty(),
            _ => Body::from("Internal Server Error"),
        };
        (status, body).into_response()
    }
}
