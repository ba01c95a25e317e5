//! Request and response shapes of the upstream assistants API.
//!
//! Only the fields the orchestrator reads are modeled; everything else the
//! upstream sends is ignored on deserialization.

use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

/// Body for appending a message to a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
}

impl CreateMessageRequest {
    /// The orchestrator only ever posts user messages.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Body for starting a run.
///
/// `assistant_id: None` marks the field as "fill server-side": it is omitted
/// from the wire and the proxy injects the configured identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRunRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
}

impl CreateRunRequest {
    pub fn server_assistant() -> Self {
        Self::default()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A conversation container held by the upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Unix seconds.
    pub created_at: i64,
}

/// One invocation of the assistant against a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub status: RunStatus,
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Statuses that end polling with a failure.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message listing, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

impl MessageList {
    /// First assistant-authored entry in upstream order.
    pub fn latest_assistant(&self) -> Option<&ThreadMessage> {
        self.data.iter().find(|m| m.role == MessageRole::Assistant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message stored on a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub created_at: i64,
}

impl ThreadMessage {
    /// Primary text content: the value of the first text block.
    pub fn primary_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    /// Image files, refusals and other block types the display cannot show.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_assistant_run_request_omits_field() {
        let value = serde_json::to_value(CreateRunRequest::server_assistant()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_user_message_request() {
        let value = serde_json::to_value(CreateMessageRequest::user("hi")).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hi" }));
    }

    #[test]
    fn test_run_status_parsing() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "status": "in_progress"
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(!run.status.is_terminal_failure());
    }

    #[test]
    fn test_unknown_run_status_is_not_terminal() {
        let run: Run =
            serde_json::from_value(json!({ "id": "run_1", "status": "paused_for_review" })).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_completed());
        assert!(!run.status.is_terminal_failure());
    }

    #[test]
    fn test_terminal_failures() {
        for status in [RunStatus::Failed, RunStatus::Cancelled, RunStatus::Expired] {
            assert!(status.is_terminal_failure(), "{status}");
        }
        for status in [RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed] {
            assert!(!status.is_terminal_failure(), "{status}");
        }
    }

    #[test]
    fn test_latest_assistant_skips_user_and_other_blocks() {
        let list: MessageList = serde_json::from_value(json!({
            "object": "list",
            "data": [
                {
                    "id": "msg_user",
                    "role": "user",
                    "content": [{ "type": "text", "text": { "value": "hi", "annotations": [] } }],
                    "created_at": 3
                },
                {
                    "id": "msg_assistant",
                    "role": "assistant",
                    "content": [
                        { "type": "image_file", "image_file": { "file_id": "f" } },
                        { "type": "text", "text": { "value": "Try Heat.", "annotations": [] } }
                    ],
                    "created_at": 2
                }
            ]
        }))
        .unwrap();

        let reply = list.latest_assistant().unwrap();
        assert_eq!(reply.id, "msg_assistant");
        assert_eq!(reply.primary_text(), Some("Try Heat."));
    }
}
