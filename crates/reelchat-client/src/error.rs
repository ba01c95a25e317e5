//! Client error types.

use reelchat_protocol::RunStatus;
use thiserror::Error;

/// Result type for client operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Which proxied call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raw proxy call before a stage is known.
    Proxy,
    Warmup,
    CreateConversation,
    PostMessage,
    StartRun,
    PollRun,
    ListMessages,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy call",
            Self::Warmup => "warm-up",
            Self::CreateConversation => "create conversation",
            Self::PostMessage => "post message",
            Self::StartRun => "start run",
            Self::PollRun => "poll run",
            Self::ListMessages => "list messages",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a client operation.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The proxy could not be reached.
    #[error("Failed to reach proxy: {0}")]
    Transport(String),

    /// The proxy answered with a non-2xx status.
    #[error("API error ({status}) during {stage}: {message}")]
    Upstream {
        stage: Stage,
        status: u16,
        message: String,
    },

    /// A 2xx body did not have the shape the stage expects.
    #[error("Unexpected response during {stage}: {message}")]
    InvalidResponse { stage: Stage, message: String },

    /// The run reached a failing terminal status.
    #[error("Run {status}")]
    RunFailed { status: RunStatus },

    #[error("Run did not complete after {attempts} status checks")]
    RunTimedOut { attempts: u32 },

    #[error("No assistant response found")]
    NoAssistantResponse,

    #[error("Assistant response contained no text")]
    EmptyReply,

    #[error("Message text is empty")]
    EmptyMessage,
}

impl ChatError {
    /// Attribute a transport-level decode failure to the calling stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::InvalidResponse {
                stage: Stage::Proxy,
                message,
            } => Self::InvalidResponse { stage, message },
            other => other,
        }
    }

    /// Whether resubmitting the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Upstream { .. } | Self::RunTimedOut { .. }
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
