//! Call surface used by chat front ends.

use reelchat_protocol::{Conversation, Message};

use crate::error::ChatResult;
use crate::orchestrator::{Orchestrator, PollPolicy};
use crate::transport::{HttpProxyTransport, ProxyTransport};

/// Thin wrapper over an [`Orchestrator`].
pub struct ChatClient<T> {
    orchestrator: Orchestrator<T>,
}

impl ChatClient<HttpProxyTransport> {
    /// Client for the proxy at `proxy_url` with the default poll policy.
    pub fn connect(proxy_url: impl Into<String>) -> ChatResult<Self> {
        Ok(Self::new(HttpProxyTransport::new(proxy_url)?))
    }
}

impl<T: ProxyTransport> ChatClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, PollPolicy::default())
    }

    pub fn with_policy(transport: T, policy: PollPolicy) -> Self {
        Self {
            orchestrator: Orchestrator::with_policy(transport, policy),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<T> {
        &self.orchestrator
    }

    /// Fire-and-forget warm-up. Never fails; `false` means the ping did not succeed.
    pub async fn warmup(&self) -> bool {
        match self.orchestrator.transport().health_check().await {
            Ok(()) => {
                log::debug!("proxy warmed up");
                true
            }
            Err(e) => {
                log::debug!("warm-up failed: {e}");
                false
            }
        }
    }

    pub async fn create_conversation(&self) -> ChatResult<Conversation> {
        self.orchestrator.create_conversation().await
    }

    /// Run the full exchange for one user message.
    pub async fn send_message(&self, conversation_id: &str, text: &str) -> ChatResult<Message> {
        self.orchestrator.exchange(conversation_id, text).await
    }
}
