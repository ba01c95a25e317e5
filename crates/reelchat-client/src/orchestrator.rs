//! Per-message conversation sequence.
//!
//! Sending one message is five proxied calls: post the user message, start a
//! run, poll the run until it settles, list the thread's messages and pick
//! the newest assistant reply. Any failure aborts the whole sequence; nothing
//! is retried here.

use std::time::Duration;

use reelchat_protocol::{
    Conversation, CreateMessageRequest, CreateRunRequest, Message, MessageList, ProxyRequest, Run,
    Thread,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ChatError, ChatResult, Stage};
use crate::format::format_reply;
use crate::transport::ProxyTransport;

/// Bounded polling: at most `max_attempts` status checks, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(1),
        }
    }
}

impl PollPolicy {
    /// No delay between checks.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            interval: Duration::ZERO,
        }
    }
}

/// Where an exchange is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    MessagePosted,
    RunStarted,
    Polling,
    Completed,
    Failed,
}

/// Drives conversations through a [`ProxyTransport`].
pub struct Orchestrator<T> {
    transport: T,
    policy: PollPolicy,
}

impl<T: ProxyTransport> Orchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, PollPolicy::default())
    }

    pub fn with_policy(transport: T, policy: PollPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create an upstream thread for a new chat session.
    pub async fn create_conversation(&self) -> ChatResult<Conversation> {
        let thread: Thread = self
            .request(
                Stage::CreateConversation,
                ProxyRequest::post("threads", None),
            )
            .await?;
        info!(conversation_id = %thread.id, "conversation created");
        Ok(thread.into())
    }

    /// Send `text` on `conversation_id` and wait for the assistant's reply.
    pub async fn exchange(&self, conversation_id: &str, text: &str) -> ChatResult<Message> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut state = ExchangeState::Idle;
        match self.run_exchange(conversation_id, text, &mut state).await {
            Ok(message) => {
                transition(&mut state, ExchangeState::Completed);
                Ok(message)
            }
            Err(err) => {
                warn!(conversation_id, from = ?state, error = %err, "exchange failed");
                transition(&mut state, ExchangeState::Failed);
                Err(err)
            }
        }
    }

    async fn run_exchange(
        &self,
        thread_id: &str,
        text: &str,
        state: &mut ExchangeState,
    ) -> ChatResult<Message> {
        let _: serde_json::Value = self
            .request(
                Stage::PostMessage,
                post(
                    Stage::PostMessage,
                    format!("threads/{thread_id}/messages"),
                    &CreateMessageRequest::user(text),
                )?,
            )
            .await?;
        transition(state, ExchangeState::MessagePosted);

        let run: Run = self
            .request(
                Stage::StartRun,
                post(
                    Stage::StartRun,
                    format!("threads/{thread_id}/runs"),
                    &CreateRunRequest::server_assistant(),
                )?,
            )
            .await?;
        transition(state, ExchangeState::RunStarted);

        transition(state, ExchangeState::Polling);
        self.wait_for_completion(thread_id, &run.id).await?;

        self.fetch_reply(thread_id).await
    }

    /// Poll first, then sleep. No sleep follows the final attempt.
    async fn wait_for_completion(&self, thread_id: &str, run_id: &str) -> ChatResult<Run> {
        let max_attempts = self.policy.max_attempts;
        let endpoint = format!("threads/{thread_id}/runs/{run_id}");

        for attempt in 1..=max_attempts {
            let run: Run = self
                .request(Stage::PollRun, ProxyRequest::get(endpoint.clone()))
                .await?;
            debug!(run_id, attempt, status = %run.status, "polled run");

            if run.status.is_completed() {
                return Ok(run);
            }
            if run.status.is_terminal_failure() {
                return Err(ChatError::RunFailed { status: run.status });
            }
            if attempt < max_attempts && !self.policy.interval.is_zero() {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        Err(ChatError::RunTimedOut {
            attempts: max_attempts,
        })
    }

    async fn fetch_reply(&self, thread_id: &str) -> ChatResult<Message> {
        let list: MessageList = self
            .request(
                Stage::ListMessages,
                ProxyRequest::get(format!("threads/{thread_id}/messages")),
            )
            .await?;

        let reply = list
            .latest_assistant()
            .ok_or(ChatError::NoAssistantResponse)?;
        let text = reply
            .primary_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(ChatError::EmptyReply)?;

        Ok(Message::assistant(reply.id.clone(), format_reply(text)))
    }

    /// One proxied call, decoded into the shape `stage` expects.
    async fn request<R: DeserializeOwned>(
        &self,
        stage: Stage,
        request: ProxyRequest,
    ) -> ChatResult<R> {
        let response = self
            .transport
            .call(&request)
            .await
            .map_err(|e| e.in_stage(stage))?;

        if !response.is_success() {
            let message = response
                .error_message()
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(ChatError::Upstream {
                stage,
                status: response.status,
                message,
            });
        }

        serde_json::from_value(response.body).map_err(|e| ChatError::InvalidResponse {
            stage,
            message: e.to_string(),
        })
    }
}

fn post(stage: Stage, endpoint: String, payload: &impl Serialize) -> ChatResult<ProxyRequest> {
    let payload = serde_json::to_value(payload).map_err(|e| ChatError::InvalidResponse {
        stage,
        message: e.to_string(),
    })?;
    Ok(ProxyRequest::post(endpoint, Some(payload)))
}

fn transition(state: &mut ExchangeState, next: ExchangeState) {
    debug!(from = ?*state, to = ?next, "exchange state");
    *state = next;
}
