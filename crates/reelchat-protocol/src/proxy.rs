//! The envelope exchanged between the client and the proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder older clients put in `assistant_id` to ask the proxy to fill in
/// the server-held identifier. New clients omit the field instead.
pub const LEGACY_ASSISTANT_SENTINEL: &str = "{assistant_id}";

/// HTTP method the proxy should use against the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body accepted by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// Upstream path relative to the API root, e.g. `threads/abc/messages`.
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ProxyRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
            payload: None,
        }
    }

    pub fn post(endpoint: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            payload,
        }
    }
}

/// Normalized result of one proxied call.
///
/// `status` mirrors the upstream status unless the proxy synthesized the
/// response itself (validation, configuration or transport failures), in which
/// case `body` carries an `error` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: Value,
}

impl ProxyResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable failure reason carried in the body.
    ///
    /// Understands both the proxy's own `{"error": "..."}` and the upstream
    /// `{"error": {"message": "..."}}` shapes.
    pub fn error_message(&self) -> Option<String> {
        match self.body.get("error")? {
            Value::String(message) => Some(message.clone()),
            Value::Object(obj) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}
