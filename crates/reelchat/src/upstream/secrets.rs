//! Server-held credentials and their injection into outbound requests.

use std::env;

use reelchat_protocol::{HttpMethod, LEGACY_ASSISTANT_SENTINEL};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use thiserror::Error;

use super::endpoint::Endpoint;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ASSISTANT_ID_ENV: &str = "OPENAI_ASSISTANT_ID";

const BETA_HEADER: HeaderName = HeaderName::from_static("openai-beta");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("API key not configured on server")]
    ApiKeyMissing,

    #[error("API key contains characters not allowed in a header")]
    ApiKeyMalformed,

    #[error("Assistant ID not configured on server")]
    AssistantIdMissing,

    #[error("protocol version header '{0}' is not a valid header value")]
    BetaHeaderMalformed(String),
}

/// Credentials loaded once at process start.
#[derive(Clone, Default)]
pub struct Secrets {
    api_key: Option<String>,
    assistant_id: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("assistant_id", &self.assistant_id.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A request ready to go upstream: auth headers set, payload filled in.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Secrets {
    /// Empty strings count as unset.
    pub fn new(api_key: Option<String>, assistant_id: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|v| !v.trim().is_empty()),
            assistant_id: assistant_id.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::var(API_KEY_ENV).ok(), env::var(ASSISTANT_ID_ENV).ok())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_assistant_id(&self) -> bool {
        self.assistant_id.is_some()
    }

    /// Fail fast when no credential is configured, before any other work.
    pub fn require_api_key(&self) -> Result<&str, SecretError> {
        self.api_key.as_deref().ok_or(SecretError::ApiKeyMissing)
    }

    /// Build the outbound request for `endpoint`.
    ///
    /// The caller's payload is never mutated; substitution happens on a copy.
    pub fn prepare(
        &self,
        endpoint: &Endpoint,
        method: HttpMethod,
        payload: Option<&Value>,
        beta_header: &str,
    ) -> Result<OutboundRequest, SecretError> {
        let api_key = self.require_api_key()?;

        let mut body = payload.cloned();
        match assistant_fill(endpoint, method, body.as_ref()) {
            AssistantFill::Untouched => {}
            AssistantFill::Sentinel => match &self.assistant_id {
                Some(assistant_id) => {
                    body = Some(with_assistant_id(body.take(), assistant_id));
                    tracing::debug!(endpoint = %endpoint, "replaced legacy assistant placeholder");
                }
                None if endpoint.is_runs() => return Err(SecretError::AssistantIdMissing),
                None => {
                    tracing::warn!(endpoint = %endpoint, "assistant placeholder sent but no identifier configured");
                }
            },
            AssistantFill::Omitted => {
                let assistant_id = self
                    .assistant_id
                    .as_ref()
                    .ok_or(SecretError::AssistantIdMissing)?;
                body = Some(with_assistant_id(body.take(), assistant_id));
                tracing::debug!(endpoint = %endpoint, "filled assistant identifier server-side");
            }
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| SecretError::ApiKeyMalformed)?;
        auth.set_sensitive(true);
        let beta = HeaderValue::from_str(beta_header)
            .map_err(|_| SecretError::BetaHeaderMalformed(beta_header.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(BETA_HEADER, beta);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(OutboundRequest {
            method,
            headers,
            body,
        })
    }
}

/// How the payload's `assistant_id` must be completed before forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssistantFill {
    Untouched,
    /// Top-level `assistant_id` carries the legacy placeholder. Replaced on
    /// every endpoint and method.
    Sentinel,
    /// Starting a run without naming the assistant.
    Omitted,
}

fn assistant_fill(endpoint: &Endpoint, method: HttpMethod, payload: Option<&Value>) -> AssistantFill {
    let field = match payload {
        Some(Value::Object(obj)) => obj.get("assistant_id"),
        _ => None,
    };
    if matches!(field, Some(Value::String(id)) if id == LEGACY_ASSISTANT_SENTINEL) {
        return AssistantFill::Sentinel;
    }

    let starts_run = matches!(endpoint, Endpoint::ThreadRuns { .. }) && method == HttpMethod::Post;
    let unnamed = match payload {
        None | Some(Value::Null) => true,
        Some(Value::Object(_)) => matches!(field, None | Some(Value::Null)),
        Some(_) => false,
    };
    if starts_run && unnamed {
        AssistantFill::Omitted
    } else {
        AssistantFill::Untouched
    }
}

fn with_assistant_id(body: Option<Value>, assistant_id: &str) -> Value {
    let mut obj = match body {
        Some(Value::Object(obj)) => obj,
        _ => Map::new(),
    };
    obj.insert(
        "assistant_id".to_string(),
        Value::String(assistant_id.to_string()),
    );
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BETA: &str = "assistants=v2";

    fn runs() -> Endpoint {
        Endpoint::ThreadRuns {
            thread_id: "thread_1".to_string(),
        }
    }

    fn configured() -> Secrets {
        Secrets::new(Some("sk-test".to_string()), Some("asst_123".to_string()))
    }

    #[test]
    fn test_missing_api_key_fails_first() {
        let secrets = Secrets::new(None, Some("asst_123".to_string()));
        let err = secrets
            .prepare(&Endpoint::Threads, HttpMethod::Post, None, BETA)
            .unwrap_err();
        assert_eq!(err, SecretError::ApiKeyMissing);
        assert_eq!(err.to_string(), "API key not configured on server");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let secrets = Secrets::new(Some("  ".to_string()), Some(String::new()));
        assert!(!secrets.has_api_key());
        assert!(!secrets.has_assistant_id());
    }

    #[test]
    fn test_headers_carry_bearer_and_version() {
        let out = configured()
            .prepare(&Endpoint::Threads, HttpMethod::Post, None, BETA)
            .unwrap();
        assert_eq!(out.headers[AUTHORIZATION], "Bearer sk-test");
        assert!(out.headers[AUTHORIZATION].is_sensitive());
        assert_eq!(out.headers["openai-beta"], BETA);
        assert_eq!(out.headers[CONTENT_TYPE], "application/json");
        assert!(out.body.is_none());
    }

    #[test]
    fn test_sentinel_is_replaced_on_copy() {
        let payload = json!({ "assistant_id": LEGACY_ASSISTANT_SENTINEL, "instructions": "be brief" });
        let out = configured()
            .prepare(&runs(), HttpMethod::Post, Some(&payload), BETA)
            .unwrap();

        assert_eq!(
            out.body.unwrap(),
            json!({ "assistant_id": "asst_123", "instructions": "be brief" })
        );
        // caller's value untouched
        assert_eq!(payload["assistant_id"], LEGACY_ASSISTANT_SENTINEL);
    }

    #[test]
    fn test_omitted_assistant_id_is_filled() {
        let out = configured()
            .prepare(&runs(), HttpMethod::Post, Some(&json!({})), BETA)
            .unwrap();
        assert_eq!(out.body.unwrap(), json!({ "assistant_id": "asst_123" }));

        let out = configured()
            .prepare(&runs(), HttpMethod::Post, None, BETA)
            .unwrap();
        assert_eq!(out.body.unwrap(), json!({ "assistant_id": "asst_123" }));
    }

    #[test]
    fn test_explicit_assistant_id_passes_through() {
        let payload = json!({ "assistant_id": "asst_other" });
        let out = configured()
            .prepare(&runs(), HttpMethod::Post, Some(&payload), BETA)
            .unwrap();
        assert_eq!(out.body.unwrap(), payload);
    }

    #[test]
    fn test_sentinel_without_assistant_id_fails() {
        let secrets = Secrets::new(Some("sk-test".to_string()), None);
        let payload = json!({ "assistant_id": LEGACY_ASSISTANT_SENTINEL });
        let err = secrets
            .prepare(&runs(), HttpMethod::Post, Some(&payload), BETA)
            .unwrap_err();
        assert_eq!(err, SecretError::AssistantIdMissing);
        assert_eq!(err.to_string(), "Assistant ID not configured on server");
    }

    #[test]
    fn test_non_run_operations_do_not_need_assistant_id() {
        let secrets = Secrets::new(Some("sk-test".to_string()), None);
        let messages = Endpoint::ThreadMessages {
            thread_id: "thread_1".to_string(),
        };
        let payload = json!({ "role": "user", "content": "{assistant_id}" });
        let out = secrets
            .prepare(&messages, HttpMethod::Post, Some(&payload), BETA)
            .unwrap();
        assert_eq!(out.body.unwrap(), payload);

        let poll = Endpoint::ThreadRun {
            thread_id: "thread_1".to_string(),
            run_id: "run_1".to_string(),
        };
        assert!(secrets.prepare(&poll, HttpMethod::Get, None, BETA).is_ok());
        assert!(secrets.prepare(&runs(), HttpMethod::Get, None, BETA).is_ok());
    }

    #[test]
    fn test_sentinel_on_any_run_path_requires_assistant_id() {
        let secrets = Secrets::new(Some("sk-test".to_string()), None);
        let payload = json!({ "assistant_id": LEGACY_ASSISTANT_SENTINEL });
        let run = Endpoint::parse("threads/t1/runs/r1").unwrap();

        for (endpoint, method) in [
            (&run, HttpMethod::Post),
            (&run, HttpMethod::Get),
            (&runs(), HttpMethod::Get),
        ] {
            let err = secrets
                .prepare(endpoint, method, Some(&payload), BETA)
                .unwrap_err();
            assert_eq!(err, SecretError::AssistantIdMissing, "{method} {endpoint}");
        }
    }

    #[test]
    fn test_sentinel_replaced_on_every_endpoint() {
        let payload = json!({ "assistant_id": LEGACY_ASSISTANT_SENTINEL, "role": "user" });
        for path in ["threads", "threads/t1/messages", "threads/t1/runs/r1"] {
            let endpoint = Endpoint::parse(path).unwrap();
            for method in [HttpMethod::Get, HttpMethod::Post] {
                let out = configured()
                    .prepare(&endpoint, method, Some(&payload), BETA)
                    .unwrap();
                assert_eq!(
                    out.body.unwrap(),
                    json!({ "assistant_id": "asst_123", "role": "user" }),
                    "{method} {path}"
                );
            }
        }
    }

    #[test]
    fn test_sentinel_outside_runs_without_assistant_id_passes() {
        let secrets = Secrets::new(Some("sk-test".to_string()), None);
        let payload = json!({ "assistant_id": LEGACY_ASSISTANT_SENTINEL });
        let messages = Endpoint::parse("threads/t1/messages").unwrap();
        let out = secrets
            .prepare(&messages, HttpMethod::Post, Some(&payload), BETA)
            .unwrap();
        assert_eq!(out.body.unwrap(), payload);
    }

    #[test]
    fn test_debug_redacts_values() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("asst_123"));
        assert!(rendered.contains("<redacted>"));
    }
}
