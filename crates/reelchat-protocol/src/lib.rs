//! Protocol types for reelchat.
//!
//! Three boundaries share these types:
//!
//! ```text
//! Client (orchestrator) <--[ProxyRequest / ProxyResponse]--> Proxy <--[assistants API]--> Upstream
//!          |
//!       Display (Conversation, Message)
//! ```
//!
//! The proxy only ever sees `ProxyRequest` envelopes. The upstream shapes in
//! [`upstream`] are what the client expects to find inside `ProxyResponse::body`
//! for each operation, validated at the boundary instead of walked as raw JSON.

pub mod display;
pub mod proxy;
pub mod upstream;

pub use display::{Conversation, Message, Sender};
pub use proxy::{HttpMethod, LEGACY_ASSISTANT_SENTINEL, ProxyRequest, ProxyResponse};
pub use upstream::{
    CreateMessageRequest, CreateRunRequest, MessageContent, MessageList, MessageRole, Run,
    RunStatus, TextContent, Thread, ThreadMessage,
};
