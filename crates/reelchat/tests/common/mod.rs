//! Test utilities and common setup.

#![allow(dead_code)]

pub mod upstream;

use axum::{Router, body::Body, http::Response};
use reelchat::api::{self, AppState};
use reelchat::config::UpstreamConfig;
use reelchat::upstream::{Forwarder, Secrets};
use serde_json::Value;

pub const TEST_API_KEY: &str = "sk-test-key";
pub const TEST_ASSISTANT_ID: &str = "asst_test";

/// Router pointed at `base_url` with both secrets configured.
pub fn test_app(base_url: &str) -> Router {
    test_app_with_secrets(
        base_url,
        Secrets::new(
            Some(TEST_API_KEY.to_string()),
            Some(TEST_ASSISTANT_ID.to_string()),
        ),
    )
}

pub fn test_app_with_secrets(base_url: &str, secrets: Secrets) -> Router {
    let config = UpstreamConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..UpstreamConfig::default()
    };
    let forwarder = Forwarder::new(&config).expect("build forwarder");
    api::create_router(AppState::new(forwarder, secrets))
}

/// Router whose upstream is unreachable. For tests that must fail before forwarding.
pub fn offline_app(secrets: Secrets) -> Router {
    test_app_with_secrets("http://127.0.0.1:9/v1", secrets)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
