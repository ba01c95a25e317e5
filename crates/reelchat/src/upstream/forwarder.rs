//! HTTP client performing the actual upstream call.

use std::time::Instant;

use reelchat_protocol::{HttpMethod, ProxyResponse};
use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::endpoint::Endpoint;
use super::secrets::OutboundRequest;
use crate::config::UpstreamConfig;

#[derive(Debug, Error)]
#[error("failed to build upstream HTTP client: {0}")]
pub struct ForwarderInitError(#[from] reqwest::Error);

/// Client for the upstream assistants API.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    /// API root without trailing slash, e.g. "https://api.openai.com/v1".
    base_url: String,
    beta_header: String,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForwarderInitError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            beta_header: config.beta_header.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Protocol-version header value sent with every request.
    pub fn beta_header(&self) -> &str {
        &self.beta_header
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// Perform the call and normalize the outcome.
    ///
    /// Never fails: transport errors and unparseable bodies become synthesized
    /// 500 envelopes; upstream error statuses are passed through untouched.
    pub async fn forward(&self, endpoint: &Endpoint, request: OutboundRequest) -> ProxyResponse {
        let url = self.url_for(endpoint);
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let mut builder = builder.headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, %url, "forwarding upstream");
        let started = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(%url, error = %e, "upstream request failed");
                return synthesized(e.to_string());
            }
        };

        let status = response.status();
        let raw = match response.bytes().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(%url, %status, error = %e, "failed to read upstream body");
                return synthesized(e.to_string());
            }
        };

        let body = match serde_json::from_slice(&raw) {
            Ok(body) => body,
            Err(e) => {
                let raw_text = String::from_utf8_lossy(&raw).into_owned();
                error!(%url, %status, error = %e, "failed to parse upstream response");
                return ProxyResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    json!({
                        "error": "Failed to parse upstream response",
                        "rawResponse": raw_text,
                    }),
                );
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_success() {
            info!(endpoint = %endpoint, status = status.as_u16(), elapsed_ms, "upstream call succeeded");
        } else {
            warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                elapsed_ms,
                body = %body,
                "upstream returned error status"
            );
        }

        ProxyResponse::new(status.as_u16(), body)
    }
}

fn synthesized(message: String) -> ProxyResponse {
    ProxyResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        json!({ "error": message }),
    )
}
