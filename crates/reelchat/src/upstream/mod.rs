//! Upstream assistants API access: path allow-list, credential injection and
//! the forwarding client.

mod endpoint;
mod forwarder;
mod secrets;

pub use endpoint::{ALLOWED_TEMPLATES, Endpoint, EndpointRejected};
pub use forwarder::{Forwarder, ForwarderInitError};
pub use secrets::{
    API_KEY_ENV, ASSISTANT_ID_ENV, OutboundRequest, SecretError, Secrets,
};
