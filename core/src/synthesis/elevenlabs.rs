use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    output_file_name, purge_dir, AudioArtifact, SynthesisClient, SynthesisError, SynthesisRequest,
};

const XI_API_KEY_HEADER: &str = "xi-api-key";

#[derive(Clone, Debug)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
    pub output_format: String,
    pub request_timeout_ms: u64,
    /// Longest accepted text, in characters.
    pub max_text_len: usize,
    /// Where generated audio files are written.
    pub work_dir: PathBuf,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.elevenlabs.io".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            request_timeout_ms: 60_000,
            max_text_len: 2500,
            work_dir: PathBuf::from("temp_audio"),
        }
    }
}

#[derive(Serialize, Debug)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech over plain HTTPS
#[derive(Clone)]
pub struct ElevenLabsClient {
    cfg: ElevenLabsConfig,
    http_client: reqwest::Client,
}

impl ElevenLabsClient {
    pub fn new(cfg: ElevenLabsConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .user_agent("vocalis/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        info!(
            target: "synthesis",
            model = %cfg.model_id,
            format = %cfg.output_format,
            work_dir = ?cfg.work_dir,
            "ElevenLabs client configured"
        );
        Self { cfg, http_client }
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.cfg
    }

    /// Delete artifacts left behind by a previous run.
    pub async fn purge_work_dir(&self) -> std::io::Result<usize> {
        let removed = purge_dir(&self.cfg.work_dir).await?;
        if removed > 0 {
            info!(target: "synthesis", removed, dir = ?self.cfg.work_dir, "Removed stale audio files");
        }
        Ok(removed)
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.cfg.base_url.trim_end_matches('/'),
            voice_id,
            self.cfg.output_format
        )
    }
}

#[async_trait]
impl SynthesisClient for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioArtifact, SynthesisError> {
        let len = request.text.chars().count();
        if len > self.cfg.max_text_len {
            return Err(SynthesisError::TextTooLong {
                len,
                max: self.cfg.max_text_len,
            });
        }

        debug!(target: "synthesis", voice_id = %request.voice_id, chars = len, "Requesting synthesis");

        let resp = self
            .http_client
            .post(self.endpoint(&request.voice_id))
            .header(XI_API_KEY_HEADER, &self.cfg.api_key)
            .header("Accept", "audio/mpeg")
            .json(&TextToSpeechBody {
                text: &request.text,
                model_id: &self.cfg.model_id,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(target: "synthesis", status, voice_id = %request.voice_id, "Provider rejected synthesis");
            return Err(SynthesisError::Provider { status, body });
        }

        let audio = resp.bytes().await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        let dir = &self.cfg.work_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| SynthesisError::Io {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(output_file_name(&request.output_id));
        if let Err(source) = tokio::fs::write(&path, &audio).await {
            // Never leave a truncated file behind
            let _ = tokio::fs::remove_file(&path).await;
            return Err(SynthesisError::Io { path, source });
        }

        info!(target: "synthesis", path = ?path, bytes = audio.len(), "Audio generated");
        Ok(AudioArtifact {
            path,
            size_bytes: audio.len(),
        })
    }
}
