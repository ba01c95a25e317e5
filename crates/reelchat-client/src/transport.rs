//! Transport to the assistant proxy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reelchat_protocol::{ProxyRequest, ProxyResponse};
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{ChatError, ChatResult, Stage};

/// Something that can deliver a proxy envelope and bring back the result.
///
/// A non-2xx [`ProxyResponse`] is a successful call; only failures to talk
/// to the proxy at all are errors.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    async fn call(&self, request: &ProxyRequest) -> ChatResult<ProxyResponse>;

    /// Warm-up ping. Does not touch the upstream API.
    async fn health_check(&self) -> ChatResult<()>;
}

#[async_trait]
impl<T: ProxyTransport + ?Sized> ProxyTransport for Arc<T> {
    async fn call(&self, request: &ProxyRequest) -> ChatResult<ProxyResponse> {
        (**self).call(request).await
    }

    async fn health_check(&self) -> ChatResult<()> {
        (**self).health_check().await
    }
}

/// Proxy client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProxyTransport {
    client: Client,
    /// Full proxy URL, e.g. "https://reelchat.example/.netlify/functions/openai-proxy".
    proxy_url: String,
}

impl HttpProxyTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(proxy_url: impl Into<String>) -> ChatResult<Self> {
        let client = Client::builder().timeout(Self::DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, proxy_url))
    }

    pub fn with_client(client: Client, proxy_url: impl Into<String>) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

#[async_trait]
impl ProxyTransport for HttpProxyTransport {
    async fn call(&self, request: &ProxyRequest) -> ChatResult<ProxyResponse> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.proxy_url)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let raw = response.bytes().await?;
        log::debug!(
            "{} {} -> {} in {}ms",
            request.method,
            request.endpoint,
            status,
            started.elapsed().as_millis()
        );

        let body = match serde_json::from_slice::<Value>(&raw) {
            Ok(body) => body,
            Err(e) if (200..300).contains(&status) => {
                log::warn!("proxy returned a non-JSON body for {}: {}", request.endpoint, e);
                return Err(ChatError::InvalidResponse {
                    stage: Stage::Proxy,
                    message: "Invalid JSON response from server".to_string(),
                });
            }
            // Error statuses keep their raw text so the caller can still report the status.
            Err(_) => json!({
                "error": "Failed to parse proxy response",
                "rawResponse": String::from_utf8_lossy(&raw),
            }),
        };

        Ok(ProxyResponse::new(status, body))
    }

    async fn health_check(&self) -> ChatResult<()> {
        let started = Instant::now();
        let response = self
            .client
            .get(&self.proxy_url)
            .query(&[("health", "check")])
            .send()
            .await?;

        let status = response.status();
        log::debug!(
            "warm-up ping -> {} in {}ms",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if status.is_success() {
            Ok(())
        } else {
            Err(ChatError::Upstream {
                stage: Stage::Warmup,
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("warm-up failed")
                    .to_string(),
            })
        }
    }
}
