use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vocalis_bridge::{spawn_idle_sweeper, BridgeConfig, TelegramTransport, UpdatePoller};
use vocalis_core::{
    DialogController, ElevenLabsClient, InMemorySessionStore, SessionStore, VoiceCatalog,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,vocalis_core=info,vocalis_bridge=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .init();

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = BridgeConfig::load();
    if let Err(e) = cfg.validate() {
        error!(target: "vocalis", error = %e, "Invalid configuration; refusing to start");
        return Err(e.into());
    }

    let synthesizer = ElevenLabsClient::new(cfg.elevenlabs.clone());
    if let Err(e) = synthesizer.purge_work_dir().await {
        error!(target: "vocalis", error = %e, "Could not clean the audio directory");
    }

    let catalog = Arc::new(VoiceCatalog::premade());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let transport = Arc::new(TelegramTransport::new(&cfg.telegram));
    let controller = Arc::new(DialogController::new(
        Arc::clone(&catalog),
        Arc::clone(&sessions),
        Arc::new(synthesizer),
        transport.clone(),
        cfg.dialog_settings(),
    ));

    let sweeper = cfg
        .session_idle_ttl_secs
        .map(|ttl| spawn_idle_sweeper(Arc::clone(&sessions), Duration::from_secs(ttl)));

    info!(
        target: "vocalis",
        voices = catalog.len(),
        max_text_len = cfg.elevenlabs.max_text_len,
        idle_ttl_secs = ?cfg.session_idle_ttl_secs,
        "Vocalis bot started"
    );

    let mut poller = UpdatePoller::new(transport.clone(), controller, &cfg.telegram);
    match transport.get_me().await {
        Ok(me) => {
            info!(target: "vocalis", bot = ?me.username, "Authenticated with Telegram");
            if let Some(username) = me.username {
                poller = poller.with_bot_username(username);
            }
        }
        Err(e) => {
            error!(target: "vocalis", error = %e, "Telegram rejected the bot token");
            return Err(e.into());
        }
    }
    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!(target: "vocalis", "Shutdown signal received");
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!(target: "vocalis", "Vocalis bot stopped");
    Ok(())
}
