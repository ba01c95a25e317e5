//! Proxy error type with fixed, client-facing messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::upstream::SecretError;

/// Failures detected locally, before anything is sent upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid JSON in request body")]
    InvalidJson(String),

    #[error("Missing endpoint parameter")]
    MissingEndpoint,

    /// Carries the rejected path for the log line only.
    #[error("Invalid endpoint requested")]
    InvalidEndpoint(String),

    #[error("Method not allowed")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Configuration(#[from] SecretError),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::MissingEndpoint => StatusCode::BAD_REQUEST,
            Self::InvalidEndpoint(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            ProxyError::Configuration(err) => {
                error!(error = %err, "proxy misconfigured");
            }
            ProxyError::InvalidEndpoint(path) => {
                warn!(endpoint = %path, "rejected endpoint, possible probing attempt");
            }
            ProxyError::InvalidJson(detail) => {
                debug!(detail = %detail, "unparseable request body");
            }
            _ => {
                debug!(message = %message, "client error");
            }
        }

        let body = ErrorResponse { error: message };

        (status, Json(body)).into_response()
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
