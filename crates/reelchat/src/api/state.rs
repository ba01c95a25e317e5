//! Application state shared across handlers.

use std::sync::Arc;

use crate::upstream::{Forwarder, Secrets};

/// Immutable per-process state. Nothing here changes between requests.
#[derive(Clone)]
pub struct AppState {
    /// Client for the upstream assistants API.
    pub forwarder: Arc<Forwarder>,
    /// Credentials read once at start-up.
    pub secrets: Arc<Secrets>,
}

impl AppState {
    pub fn new(forwarder: Forwarder, secrets: Secrets) -> Self {
        Self {
            forwarder: Arc::new(forwarder),
            secrets: Arc::new(secrets),
        }
    }
}
