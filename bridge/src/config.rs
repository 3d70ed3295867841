use std::fs;
use std::path::{Path, PathBuf};

use vocalis_core::{DialogSettings, ElevenLabsConfig};

use crate::MAX_SESSION_IDLE_TTL;

const TOKEN_PLACEHOLDER: &str = "YOUR_TELEGRAM_BOT_TOKEN_HERE";
const API_KEY_PLACEHOLDER: &str = "YOUR_ELEVENLABS_API_KEY_HERE";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} still holds the placeholder value")]
    Placeholder(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Top-level configuration for the `vocalis` binary
#[derive(Clone, Debug, Default)]
pub struct BridgeConfig {
    pub telegram: TelegramConfig,
    /// Also carries the text limit and the audio working directory.
    pub elevenlabs: ElevenLabsConfig,
    /// Evict sessions untouched for this long; `None` keeps them forever.
    pub session_idle_ttl_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    pub poll_timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            retry_backoff_ms: 3000,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by the process environment (after `.env` is loaded).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns; empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            cfg.telegram.token = v;
        }
        if let Some(v) = get("TELEGRAM_API_BASE") {
            cfg.telegram.api_base = v;
        }
        if let Some(v) = get("TELEGRAM_POLL_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            cfg.telegram.poll_timeout_secs = v;
        }
        if let Some(v) = get("ELEVENLABS_API_KEY") {
            cfg.elevenlabs.api_key = v;
        }
        if let Some(v) = get("ELEVENLABS_BASE_URL") {
            cfg.elevenlabs.base_url = v;
        }
        if let Some(v) = get("ELEVENLABS_MODEL_ID") {
            cfg.elevenlabs.model_id = v;
        }
        if let Some(v) = get("ELEVENLABS_OUTPUT_FORMAT") {
            cfg.elevenlabs.output_format = v;
        }
        if let Some(v) = get("ELEVENLABS_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            cfg.elevenlabs.request_timeout_ms = v;
        }
        if let Some(v) = get("MAX_TEXT_LENGTH").and_then(|v| v.parse().ok()) {
            cfg.elevenlabs.max_text_len = v;
        }
        if let Some(v) = get("TEMP_AUDIO_DIR") {
            cfg.elevenlabs.work_dir = PathBuf::from(v);
        }
        if let Some(v) = get("SESSION_IDLE_TTL_SECS").and_then(|v| v.parse().ok()) {
            cfg.session_idle_ttl_secs = Some(v);
        }
        cfg
    }

    /// Load configuration from a TOML file (path via VOCALIS_CONFIG or ./vocalis.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let base = Self::from_env();
        let path = std::env::var("VOCALIS_CONFIG").unwrap_or_else(|_| "vocalis.toml".into());
        base.overlay_file(Path::new(&path))
    }

    /// Overlay a TOML file; a missing or malformed file leaves `self` unchanged.
    pub fn overlay_file(self, path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(target: "vocalis", path = %path.display(), "No TOML config found; using defaults/env");
            return self;
        }
        match fs::read_to_string(path) {
            Ok(s) => match self.clone().overlay_toml(&s) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "vocalis", error = %e, "Failed to parse TOML; using defaults/env");
                    self
                }
            },
            Err(e) => {
                tracing::warn!(target: "vocalis", error = %e, "Failed to read TOML; using defaults/env");
                self
            }
        }
    }

    pub fn overlay_toml(self, s: &str) -> Result<Self, toml::de::Error> {
        let parsed = toml::from_str::<VocalisToml>(s)?;
        Ok(parsed.overlay(self))
    }

    /// Reject configurations that cannot serve traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secret("TELEGRAM_BOT_TOKEN", &self.telegram.token, TOKEN_PLACEHOLDER)?;
        check_secret("ELEVENLABS_API_KEY", &self.elevenlabs.api_key, API_KEY_PLACEHOLDER)?;
        if self.elevenlabs.max_text_len == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_TEXT_LENGTH",
                reason: "must be greater than zero".into(),
            });
        }
        if self.telegram.poll_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "TELEGRAM_POLL_TIMEOUT_SECS",
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(ttl) = self.session_idle_ttl_secs {
            if ttl == 0 || ttl > MAX_SESSION_IDLE_TTL.as_secs() {
                return Err(ConfigError::Invalid {
                    key: "SESSION_IDLE_TTL_SECS",
                    reason: format!(
                        "must be between 1 and {} seconds",
                        MAX_SESSION_IDLE_TTL.as_secs()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn dialog_settings(&self) -> DialogSettings {
        DialogSettings {
            max_text_len: self.elevenlabs.max_text_len,
            ..DialogSettings::default()
        }
    }
}

fn check_secret(key: &'static str, value: &str, placeholder: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(key));
    }
    if value == placeholder {
        return Err(ConfigError::Placeholder(key));
    }
    Ok(())
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct VocalisToml {
    pub max_text_length: Option<usize>,
    pub temp_audio_dir: Option<PathBuf>,
    pub session_idle_ttl_secs: Option<u64>,
    pub telegram: Option<TelegramToml>,
    pub elevenlabs: Option<ElevenLabsToml>,
}

impl VocalisToml {
    fn overlay(self, mut base: BridgeConfig) -> BridgeConfig {
        if let Some(t) = self.telegram {
            t.apply(&mut base.telegram);
        }
        if let Some(e) = self.elevenlabs {
            e.apply(&mut base.elevenlabs);
        }
        if let Some(v) = self.max_text_length {
            base.elevenlabs.max_text_len = v;
        }
        if let Some(v) = self.temp_audio_dir {
            base.elevenlabs.work_dir = v;
        }
        if let Some(v) = self.session_idle_ttl_secs {
            base.session_idle_ttl_secs = Some(v);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct TelegramToml {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub poll_timeout_secs: Option<u64>,
    pub retry_backoff_ms: Option<u64>,
}
impl TelegramToml {
    fn apply(self, t: &mut TelegramConfig) {
        if let Some(v) = self.token {
            t.token = v;
        }
        if let Some(v) = self.api_base {
            t.api_base = v;
        }
        if let Some(v) = self.poll_timeout_secs {
            t.poll_timeout_secs = v;
        }
        if let Some(v) = self.retry_backoff_ms {
            t.retry_backoff_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ElevenLabsToml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
    pub request_timeout_ms: Option<u64>,
}
impl ElevenLabsToml {
    fn apply(self, e: &mut ElevenLabsConfig) {
        if let Some(v) = self.api_key {
            e.api_key = v;
        }
        if let Some(v) = self.base_url {
            e.base_url = v;
        }
        if let Some(v) = self.model_id {
            e.model_id = v;
        }
        if let Some(v) = self.output_format {
            e.output_format = v;
        }
        if let Some(v) = self.request_timeout_ms {
            e.request_timeout_ms = v;
        }
    }
}
