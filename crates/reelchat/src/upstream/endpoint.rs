//! Allow-list of upstream paths the proxy will forward to.

use thiserror::Error;

/// Path templates accepted by the proxy. `{...}` matches exactly one
/// non-empty segment without a slash.
///
/// Placeholder segments additionally must not change how the joined upstream
/// URL resolves: dot segments and URL delimiters (`?`, `#`, `%`, `\`) are
/// refused.
pub const ALLOWED_TEMPLATES: [&str; 4] = [
    "threads",
    "threads/{thread_id}/messages",
    "threads/{thread_id}/runs",
    "threads/{thread_id}/runs/{run_id}",
];

/// A validated upstream operation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Threads,
    ThreadMessages { thread_id: String },
    ThreadRuns { thread_id: String },
    ThreadRun { thread_id: String, run_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("endpoint '{0}' does not match any allowed template")]
pub struct EndpointRejected(pub String);

impl Endpoint {
    /// Match `path` against [`ALLOWED_TEMPLATES`]. Anchored, exact segment
    /// count, case-sensitive.
    pub fn parse(path: &str) -> Result<Self, EndpointRejected> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(EndpointRejected(path.to_string()));
        }

        let endpoint = match segments.as_slice() {
            ["threads"] => Self::Threads,
            ["threads", thread_id, "messages"] => Self::ThreadMessages {
                thread_id: thread_id.to_string(),
            },
            ["threads", thread_id, "runs"] => Self::ThreadRuns {
                thread_id: thread_id.to_string(),
            },
            ["threads", thread_id, "runs", run_id] => Self::ThreadRun {
                thread_id: thread_id.to_string(),
                run_id: run_id.to_string(),
            },
            _ => return Err(EndpointRejected(path.to_string())),
        };

        if !endpoint.placeholders().iter().all(|id| is_safe_placeholder(id)) {
            return Err(EndpointRejected(path.to_string()));
        }
        Ok(endpoint)
    }

    fn placeholders(&self) -> Vec<&str> {
        match self {
            Self::Threads => Vec::new(),
            Self::ThreadMessages { thread_id } | Self::ThreadRuns { thread_id } => {
                vec![thread_id.as_str()]
            }
            Self::ThreadRun { thread_id, run_id } => vec![thread_id.as_str(), run_id.as_str()],
        }
    }

    /// Canonical path relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Self::Threads => "threads".to_string(),
            Self::ThreadMessages { thread_id } => format!("threads/{thread_id}/messages"),
            Self::ThreadRuns { thread_id } => format!("threads/{thread_id}/runs"),
            Self::ThreadRun { thread_id, run_id } => format!("threads/{thread_id}/runs/{run_id}"),
        }
    }

    /// Run endpoints are the only ones that may need the assistant identifier.
    pub fn is_runs(&self) -> bool {
        matches!(self, Self::ThreadRuns { .. } | Self::ThreadRun { .. })
    }
}

fn is_safe_placeholder(segment: &str) -> bool {
    segment != "."
        && segment != ".."
        && !segment
            .chars()
            .any(|c| matches!(c, '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control())
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
