//! HTTP surface of the proxy.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ErrorResponse, ProxyError, ProxyResult};
pub use handlers::{HealthResponse, WarmResponse};
pub use routes::create_router;
pub use state::AppState;
