//! HTTP request handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reelchat_protocol::{HttpMethod, ProxyRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::{ProxyError, ProxyResult};
use super::state::AppState;
use crate::upstream::Endpoint;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether an upstream credential was found at start-up.
    pub api_key_configured: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_key_configured: state.secrets.has_api_key(),
    })
}

/// Query parameters recognized on the proxy path.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    /// Present on warm-up pings; any value short-circuits.
    pub health: Option<String>,
}

/// Body of the warm-up short-circuit.
#[derive(Debug, Serialize)]
pub struct WarmResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

/// Raw request body. Every field is optional so a missing endpoint can be
/// told apart from malformed JSON.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    method: Option<HttpMethod>,
    #[serde(default)]
    payload: Option<Value>,
}

/// Forward one allow-listed operation to the upstream API.
///
/// Checks run in a fixed order: body shape, credential presence, endpoint
/// allow-list, assistant identifier. Only then is the network touched.
#[instrument(skip_all, fields(method = %method))]
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<ProxyQuery>,
    body: Bytes,
) -> ProxyResult<Response> {
    if query.health.is_some() {
        debug!("warm-up ping");
        return Ok(Json(WarmResponse {
            status: "ok",
            message: "Function is warm",
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
        .into_response());
    }

    if method != Method::GET && method != Method::POST {
        return Err(ProxyError::MethodNotAllowed(method.to_string()));
    }

    let request = parse_request(&body)?;
    state.secrets.require_api_key()?;

    let endpoint = Endpoint::parse(&request.endpoint)
        .map_err(|rejected| ProxyError::InvalidEndpoint(rejected.0))?;

    let outbound = state.secrets.prepare(
        &endpoint,
        request.method,
        request.payload.as_ref(),
        state.forwarder.beta_header(),
    )?;

    let response = state.forwarder.forward(&endpoint, outbound).await;
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(response.body)).into_response())
}

/// An empty body is treated as `{}`.
fn parse_request(body: &[u8]) -> ProxyResult<ProxyRequest> {
    let envelope: Envelope = if body.iter().all(u8::is_ascii_whitespace) {
        Envelope::default()
    } else {
        serde_json::from_slice(body).map_err(|e| ProxyError::InvalidJson(e.to_string()))?
    };

    let endpoint = envelope
        .endpoint
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or(ProxyError::MissingEndpoint)?;

    Ok(ProxyRequest {
        endpoint,
        method: envelope.method.unwrap_or_default(),
        payload: envelope.payload,
    })
}
