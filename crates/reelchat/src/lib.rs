//! Reelchat assistant proxy.
//!
//! A stateless HTTP proxy between the browser chat and the upstream assistants
//! API. It forwards a fixed allow-list of thread/run operations, injects the
//! server-held credential and assistant identifier, and normalizes every
//! outcome into a status + JSON body envelope.

pub mod api;
pub mod config;
pub mod upstream;
