//! Periodic warm-up pings.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::ChatClient;
use crate::transport::ProxyTransport;

/// Keeps the proxy process warm while a chat session is open.
///
/// Pings run on their own task and share nothing with message sends beyond
/// the client. Dropping the keeper stops the task.
pub struct WarmupKeeper {
    handle: JoinHandle<()>,
}

impl WarmupKeeper {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(4 * 60);

    /// Ping immediately, then every `period`.
    pub fn spawn<T>(client: Arc<ChatClient<T>>, period: Duration) -> Self
    where
        T: ProxyTransport + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let warm = client.warmup().await;
                tracing::trace!(warm, "warm-up tick");
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WarmupKeeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
