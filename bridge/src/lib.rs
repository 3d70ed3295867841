//! Telegram side of Vocalis: Bot API transport, update polling and
//! configuration for the `vocalis` binary.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use vocalis_core::{SessionStore, TransportError};

pub mod api;
pub mod config;
pub mod poller;
pub mod telegram;
pub mod updates;

pub use config::{BridgeConfig, ConfigError, TelegramConfig};
pub use poller::UpdatePoller;
pub use telegram::TelegramTransport;
pub use updates::to_event;

#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Longest accepted idle TTL; larger values are rejected by `BridgeConfig::validate`.
pub const MAX_SESSION_IDLE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Idle window as a chrono duration, or `None` when it does not fit.
pub fn idle_window(ttl: Duration) -> Option<chrono::Duration> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(chrono::Duration::try_seconds)
}

/// Periodically drop sessions idle for longer than `ttl`.
pub fn spawn_idle_sweeper(sessions: Arc<dyn SessionStore>, ttl: Duration) -> JoinHandle<()> {
    // Sweep a few times per TTL, between once a second and once a day.
    let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(24 * 60 * 60));
    let max_idle = idle_window(ttl);
    tokio::spawn(async move {
        let Some(max_idle) = max_idle else {
            warn!(target: "vocalis", ttl_secs = ttl.as_secs(), "Idle TTL out of range; session eviction disabled");
            return;
        };
        let mut tick = tokio::time::interval(period);
        loop {
            tick.tick().await;
            let evicted = sessions.evict_idle(max_idle);
            if evicted > 0 {
                info!(target: "vocalis", evicted, remaining = sessions.len(), "Evicted idle sessions");
            }
        }
    })
}
