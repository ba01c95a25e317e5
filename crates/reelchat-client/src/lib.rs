//! Client side of reelchat.
//!
//! Talks to the assistant proxy only; no upstream credential ever lives here.
//! [`ChatClient`] is the surface a front end uses, [`Orchestrator`] runs the
//! per-message sequence, and [`format_reply`] turns replies into display HTML.

pub mod client;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod transport;
pub mod warmup;

pub use client::ChatClient;
pub use error::{ChatError, ChatResult, Stage};
pub use format::format_reply;
pub use orchestrator::{ExchangeState, Orchestrator, PollPolicy};
pub use transport::{HttpProxyTransport, ProxyTransport};
pub use warmup::WarmupKeeper;
