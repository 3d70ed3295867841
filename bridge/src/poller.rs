use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use vocalis_core::DialogController;

use crate::config::TelegramConfig;
use crate::telegram::TelegramTransport;
use crate::updates::to_event;
use crate::Result;

/// Long-polls `getUpdates` and hands every event to the dialog on its own task.
pub struct UpdatePoller {
    transport: Arc<TelegramTransport>,
    controller: Arc<DialogController>,
    poll_timeout_secs: u64,
    retry_backoff: Duration,
    offset: i64,
    bot_username: Option<String>,
}

impl UpdatePoller {
    pub fn new(
        transport: Arc<TelegramTransport>,
        controller: Arc<DialogController>,
        cfg: &TelegramConfig,
    ) -> Self {
        Self {
            transport,
            controller,
            poll_timeout_secs: cfg.poll_timeout_secs,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
            offset: 0,
            bot_username: None,
        }
    }

    /// Only answer `/command@name` when `name` is this bot.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Next update id the poller will ask for.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Poll until the task is cancelled. Errors are logged and retried after the back-off.
    pub async fn run(mut self) {
        info!(target: "telegram", timeout_secs = self.poll_timeout_secs, "Polling for updates");
        loop {
            if let Err(e) = self.poll_once().await {
                warn!(target: "telegram", error = %e, backoff_ms = self.retry_backoff.as_millis() as u64, "Polling failed; retrying");
                tokio::time::sleep(self.retry_backoff).await;
            }
        }
    }

    /// One `getUpdates` round trip. Returns how many events were dispatched.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self
            .transport
            .get_updates(self.offset, self.poll_timeout_secs)
            .await?;

        let mut dispatched = 0;
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            if let Some(query) = &update.callback_query {
                if let Err(e) = self.transport.answer_callback_query(&query.id).await {
                    debug!(target: "telegram", error = %e, "Failed to answer callback query");
                }
            }

            let Some(event) = to_event(&update, self.bot_username.as_deref()) else {
                continue;
            };
            debug!(target: "telegram", update_id = update.update_id, user_id = event.user_id, "Dispatching update");

            let controller = Arc::clone(&self.controller);
            let user_id = event.user_id;
            let handle = tokio::spawn(async move { controller.dispatch(event).await });
            tokio::spawn(async move {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        error!(target: "telegram", user_id, "Event handler panicked");
                    }
                }
            });
            dispatched += 1;
        }
        Ok(dispatched)
    }
}
